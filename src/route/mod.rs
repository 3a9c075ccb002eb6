pub mod auth_api;
pub mod emit;
pub mod post_api;
