//! sr-db - Database layer for sqlrun
//!
//! This crate provides the `Database` gateway trait used by the script
//! runner and its PostgreSQL implementation.

pub mod credentials;
pub mod error;
pub mod options;
pub mod postgres;
pub mod traits;

pub use credentials::{DbCredentials, Endpoint};
pub use error::{DbError, DbResult};
pub use options::DbOptions;
pub use postgres::PgGateway;
pub use traits::{transaction_body, Database, Transaction, TransactionBody};
