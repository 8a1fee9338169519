// API layer module (adapters for controllers)
// Owns the application-level routes, middleware and route composition

pub mod errors;
pub mod handlers;
pub mod json;
pub mod middleware;
pub mod routes;
