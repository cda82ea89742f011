use serde::Serialize;

/// One page of a paginated listing, always a valid page: bad input is clamped before the
/// slice is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total_count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PaginationMeta {
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total_count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    pub start_index: usize,
    pub end_index: usize,
}

pub fn num_pages(total_count: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    // an empty listing still has one (empty) first page
    total_count.div_ceil(per_page).max(1)
}

// non-integers and missing values mean the first page. any integer that does not name
// a page (zero, negative, past the end, or too wide for usize) means the last one
pub fn clamp_page_number(requested: Option<&str>, num_pages: usize) -> usize {
    let Some(raw) = requested.map(str::trim) else {
        return 1;
    };

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 1;
    }
    if negative {
        return num_pages;
    }

    match digits.parse::<usize>() {
        Ok(n) if (1..=num_pages).contains(&n) => n,
        _ => num_pages,
    }
}

pub fn paginate<T>(items: Vec<T>, per_page: usize, requested: Option<&str>) -> PostPage<T> {
    let per_page = per_page.max(1);
    let total_count = items.len();
    let num_pages = num_pages(total_count, per_page);
    let number = clamp_page_number(requested, num_pages);

    let start = (number - 1) * per_page;
    let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();

    PostPage {
        items,
        number,
        num_pages,
        per_page,
        total_count,
    }
}

impl<T> PostPage<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 for an empty listing.
    pub fn start_index(&self) -> usize {
        if self.total_count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    pub fn end_index(&self) -> usize {
        if self.number == self.num_pages {
            self.total_count
        } else {
            self.number * self.per_page
        }
    }

    pub fn meta(&self) -> PaginationMeta {
        PaginationMeta {
            number: self.number,
            num_pages: self.num_pages,
            per_page: self.per_page,
            total_count: self.total_count,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            next_page_number: self.next_page_number(),
            previous_page_number: self.previous_page_number(),
            start_index: self.start_index(),
            end_index: self.end_index(),
        }
    }
}
