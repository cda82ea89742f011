use crate::config::BlogConfig;
use crate::features::blog::render::Renderer;
use crate::services::BlogService;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod parser;
pub mod services;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub config: Arc<BlogConfig>,
    pub renderer: Arc<dyn Renderer>,
}

// where features are composed
pub fn app(state: AppState) -> Router {
    let mut router = features::blog::blog_router();

    if let Some(static_dir) = &state.config.static_dir {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
