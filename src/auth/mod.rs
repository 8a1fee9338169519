// Authentication helpers: session tokens and federated identity handling

pub mod federated;
pub mod session;
pub mod verifier;
