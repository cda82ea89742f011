mod unit_io_path_verification;
mod unit_models_pages;
mod unit_path_resolver;
mod unit_post_query;
mod unit_sibling_navigator;
mod unit_tree_path;
mod unit_url_path;
