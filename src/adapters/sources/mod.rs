//! Built-in source adapters

pub mod files;
pub mod postgres;

pub use files::FilesSource;
pub use postgres::PostgresSource;
