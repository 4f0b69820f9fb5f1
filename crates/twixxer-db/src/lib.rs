pub mod chirp_repository;
pub mod config;
pub mod database;
pub mod profile_repository;

pub use chirp_repository::ChirpRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use profile_repository::ProfileRepository;
