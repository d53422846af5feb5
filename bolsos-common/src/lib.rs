//! # Bolsos Common Library
//!
//! Shared code for the bolsos catalog service:
//! - Storage access for the `bolso` table (MySQL and SQLite backends)
//! - Configuration resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use db::{BagRow, BagStore, NewBag};
pub use error::{Error, Result};
