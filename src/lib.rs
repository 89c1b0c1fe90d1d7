//! Local-first food logging: typo-tolerant search over a built-in food
//! catalog, plus crash-safe JSON repositories for the daily log, its archive,
//! favorites, recipes and a barcode lookup cache.

pub mod app;
pub mod barcode;
pub mod clock;
pub mod config;
pub mod error;
pub mod favorites;
pub mod food_log;
pub mod persistence;
pub mod recipes;
pub mod search;
pub mod state;

pub use error::{ApiError, StorageError};
