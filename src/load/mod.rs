pub mod error;
#[cfg(test)]
pub mod fake;
pub mod loader;
pub mod postgres;
pub mod row;
pub mod schema;

pub use error::LoadError;
#[cfg(test)]
pub use fake::FakeLoader;
pub use loader::Loader;
pub use postgres::PostgresLoader;
