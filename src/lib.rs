// Watchlist - a local movie list backed by SQLite

pub mod config;
pub mod controller;
pub mod filter;
pub mod movie;
pub mod store;
pub mod validate;

// Re-export main types for convenience
pub use controller::{SaveError, Watchlist};
pub use filter::{WatchFilter, derive_view};
pub use movie::{Movie, MovieForm, NewMovie, SaveRequest};
pub use store::{MovieStore, now_ms};
pub use validate::{ValidationError, validate_form};
