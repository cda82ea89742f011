use crate::database::TreeStore;
use crate::domain::tree_path::{STEP_LEN, collapse_prefixes};
use crate::domain::{Page, ViewRestriction};
use crate::features::blog::model::{DbPage, DbViewRestriction};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::collections::BTreeSet;

pub struct SqliteTreeStore {
    pool: Pool<Sqlite>,
}

impl SqliteTreeStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn into_pages(rows: Vec<DbPage>) -> Result<Vec<Page>> {
    let mut pages = Vec::with_capacity(rows.len());
    for row in rows {
        let page: Page = row.try_into()?;
        pages.push(page);
    }
    Ok(pages)
}

// subtree membership is an exact prefix comparison; LIKE would be case-insensitive
async fn fetch_subtree(pool: &Pool<Sqlite>, prefix: &str) -> Result<Vec<DbPage>> {
    let rows = sqlx::query_as::<_, DbPage>(
        "SELECT * FROM pages WHERE substr(path, 1, ?) = ? ORDER BY path",
    )
    .bind(prefix.len() as i64)
    .bind(prefix)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// nifty UPSERT, the row keeps its identity so foreign keys pointing at it survive
async fn upsert_page(conn: &mut SqliteConnection, page: &Page) -> Result<()> {
    let row: DbPage = page.into();

    sqlx::query(
        r#"
        INSERT INTO pages (
            path, depth, slug, title, url_path, live, kind, post_date,
            category_path, tags, featured_image, md_content, html_content, md_content_hash
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(path) DO UPDATE SET
            depth = excluded.depth,
            slug = excluded.slug,
            title = excluded.title,
            url_path = excluded.url_path,
            live = excluded.live,
            kind = excluded.kind,
            post_date = excluded.post_date,
            category_path = excluded.category_path,
            tags = excluded.tags,
            featured_image = excluded.featured_image,
            md_content = excluded.md_content,
            html_content = excluded.html_content,
            md_content_hash = excluded.md_content_hash
        "#,
    )
    .bind(&row.path)
    .bind(row.depth)
    .bind(&row.slug)
    .bind(&row.title)
    .bind(&row.url_path)
    .bind(row.live)
    .bind(&row.kind)
    .bind(row.post_date)
    .bind(&row.category_path)
    .bind(&row.tags)
    .bind(&row.featured_image)
    .bind(&row.md_content)
    .bind(&row.html_content)
    .bind(&row.md_content_hash)
    .execute(conn)
    .await
    .with_context(|| format!("Failed to save page {}", page.url_path))?;

    Ok(())
}

#[async_trait]
impl TreeStore for SqliteTreeStore {
    async fn get_page(&self, path: &str) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, DbPage>("SELECT * FROM pages WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        // translate to pure Page model
        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn get_page_by_url_path(&self, url_path: &str) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, DbPage>(
            "SELECT * FROM pages WHERE url_path = ? ORDER BY path LIMIT 1",
        )
        .bind(url_path)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn get_all_pages(&self) -> Result<Vec<Page>> {
        let rows = sqlx::query_as::<_, DbPage>("SELECT * FROM pages ORDER BY path")
            .fetch_all(&self.pool)
            .await?;
        into_pages(rows)
    }

    async fn root(&self) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, DbPage>(
            "SELECT * FROM pages WHERE depth = 1 ORDER BY path LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn children_of(&self, path: &str) -> Result<Vec<Page>> {
        let child_depth = (path.len() / STEP_LEN + 1) as i64;
        let rows = sqlx::query_as::<_, DbPage>(
            "SELECT * FROM pages WHERE depth = ? AND substr(path, 1, ?) = ? ORDER BY path",
        )
        .bind(child_depth)
        .bind(path.len() as i64)
        .bind(path)
        .fetch_all(&self.pool)
        .await?;
        into_pages(rows)
    }

    async fn descendants_of(&self, path: &str, inclusive: bool) -> Result<Vec<Page>> {
        let rows = fetch_subtree(&self.pool, path).await?;
        let rows = rows
            .into_iter()
            .filter(|row| inclusive || row.path != path)
            .collect();
        into_pages(rows)
    }

    async fn ancestors_matching(&self, prefixes: &BTreeSet<String>) -> Result<Vec<Page>> {
        let mut rows = Vec::new();
        for prefix in collapse_prefixes(prefixes) {
            rows.extend(fetch_subtree(&self.pool, prefix).await?);
        }
        into_pages(rows)
    }

    async fn save(&self, page: &Page) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_page(&mut conn, page).await
    }

    async fn save_subtree(&self, pages: &[Page]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for page in pages {
            upsert_page(&mut tx, page).await?;
        }
        tx.commit()
            .await
            .context("Failed to commit subtree save")?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        // category references are cleared by ON DELETE SET NULL, restrictions cascade
        sqlx::query("DELETE FROM pages WHERE substr(path, 1, ?) = ?")
            .bind(path.len() as i64)
            .bind(path)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete subtree at {}", path))?;

        Ok(())
    }

    async fn view_restrictions(&self) -> Result<Vec<ViewRestriction>> {
        let rows = sqlx::query_as::<_, DbViewRestriction>(
            "SELECT page_path, permitted_group, completely_hidden FROM view_restrictions",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ViewRestriction::from).collect())
    }

    async fn save_view_restriction(&self, restriction: &ViewRestriction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO view_restrictions (page_path, permitted_group, completely_hidden)
            VALUES (?, ?, ?)
            ON CONFLICT(page_path, permitted_group) DO UPDATE SET
                completely_hidden = excluded.completely_hidden
            "#,
        )
        .bind(&restriction.page_path)
        .bind(&restriction.permitted_group)
        .bind(restriction.completely_hidden)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to restrict page {}", restriction.page_path))?;

        Ok(())
    }

    async fn groups_for(&self, username: &str) -> Result<BTreeSet<String>> {
        let groups: Vec<(String,)> =
            sqlx::query_as("SELECT group_name FROM group_memberships WHERE username = ?")
                .bind(username)
                .fetch_all(&self.pool)
                .await?;

        Ok(groups.into_iter().map(|(group,)| group).collect())
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO group_memberships (username, group_name) VALUES (?, ?)",
        )
        .bind(username)
        .bind(group)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to add {} to group {}", username, group))?;

        Ok(())
    }
}
