// Where the movie database lives

use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DB_ENV_VAR: &str = "WATCHLIST_DB";

pub const DB_FILE_NAME: &str = "movieWatchlist.db";

/// Database location: an explicit path, or the per-user default
///
/// The explicit path normally comes from `--db` or `WATCHLIST_DB`.
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => default_db_path(),
    }
}

/// `<data dir>/watchlist/movieWatchlist.db`, or the current directory when
/// the platform has no data dir
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("watchlist"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DB_FILE_NAME)
}
