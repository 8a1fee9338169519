// Request middleware applied to every route

pub mod current_user;
pub mod payload_limit;

pub use current_user::{load_current_user, CurrentUser};
pub use payload_limit::file_too_large;
