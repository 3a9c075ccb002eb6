pub mod limit_request;
pub mod session;
