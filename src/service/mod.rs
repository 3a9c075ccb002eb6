pub mod auth_service;
pub mod pipeline;
pub mod post_service;
pub mod tag_service;
