pub mod markdown;
pub mod model;
