// Repository implementations (data access layer)

pub mod in_memory_user_repository;
pub mod postgres_user_repository;

pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_user_repository::PostgresUserRepository;
