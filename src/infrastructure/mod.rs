// Infrastructure layer module
// Contains storage adapters behind the domain repository traits

pub mod repositories;
