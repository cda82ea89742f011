pub mod model;
pub mod pagination;
pub mod query;
pub mod query_string;
pub mod render;
pub mod resolver;
pub mod restrictions;
pub mod siblings;
pub mod url_path;

use crate::AppState;
use crate::error::BlogError;
use axum::{
    Router,
    extract::{RawQuery, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use query_string::QueryParams;

// every path that no other route claims is a page of the tree
pub fn blog_router() -> Router<AppState> {
    Router::new().fallback(serve_page_handler)
}

async fn serve_page_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, BlogError> {
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();

    // whoever sits in front of us (a proxy, an auth middleware) vouches for the username
    let username = headers
        .get(state.config.user_header.as_str())
        .and_then(|value| value.to_str().ok());

    let viewer = state.blog.viewer(username).await?;
    let params = QueryParams::parse(query.as_deref());

    let rendered = state
        .blog
        .render_path(&path, &viewer, &params, state.renderer.as_ref())
        .await?;

    Ok(([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response())
}
