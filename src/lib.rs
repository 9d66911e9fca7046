//! GoNext: a local travel diary.
//!
//! Places, trips and ordered visit routes stored in SQLite, with photos kept
//! in a plain directory tree next to the database.

pub mod config;
pub mod db;
pub mod localize;
pub mod logging;
pub mod photos;
pub mod validate;

pub use db::{Database, DbError};
pub use photos::PhotoStore;
