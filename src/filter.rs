// Search and watched-state filtering over the loaded list

use crate::movie::Movie;
use serde::{Deserialize, Serialize};

/// Which movies to show by watched state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WatchFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchFilter {
    pub fn matches(self, movie: &Movie) -> bool {
        match self {
            WatchFilter::All => true,
            WatchFilter::Watched => movie.watched == 1,
            WatchFilter::Unwatched => movie.watched == 0,
        }
    }
}

impl std::fmt::Display for WatchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchFilter::All => write!(f, "all"),
            WatchFilter::Watched => write!(f, "watched"),
            WatchFilter::Unwatched => write!(f, "unwatched"),
        }
    }
}

/// The subset of `movies` to display
///
/// Keeps movies whose title contains `search` ignoring case (an empty search
/// keeps everything), then applies `filter`. Input order is preserved.
pub fn derive_view<'a>(movies: &'a [Movie], search: &str, filter: WatchFilter) -> Vec<&'a Movie> {
    let needle = search.to_lowercase();

    movies
        .iter()
        .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .filter(|m| filter.matches(m))
        .collect()
}
