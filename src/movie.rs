// Movie records and the drafts that become them

use serde::{Deserialize, Serialize};

/// A stored movie entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    /// 0 or 1, mirroring the column
    pub watched: i64,
    pub rating: Option<i32>,
    /// Milliseconds since epoch, set once on insert
    pub created_at: i64,
}

impl Movie {
    pub fn is_watched(&self) -> bool {
        self.watched != 0
    }
}

/// Field values for a movie that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub watched: i64,
    pub rating: Option<i32>,
}

impl NewMovie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            watched: 0,
            rating: None,
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn watched(mut self, watched: bool) -> Self {
        self.watched = watched as i64;
        self
    }
}

/// Raw form input, exactly as a user typed it
///
/// `year` and `rating` are text; an empty (or whitespace-only) value means
/// "not supplied" and is stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub watched: bool,
}

impl MovieForm {
    /// Prefill a form from an existing record, the way an edit dialog opens
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year.map(|y| y.to_string()).unwrap_or_default(),
            rating: movie.rating.map(|r| r.to_string()).unwrap_or_default(),
            watched: movie.is_watched(),
        }
    }

    /// Replace only the fields that were given
    ///
    /// `None` keeps the current value; an empty year or rating clears it.
    pub fn with_overrides(
        mut self,
        title: Option<String>,
        year: Option<String>,
        rating: Option<String>,
        watched: Option<bool>,
    ) -> Self {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(year) = year {
            self.year = year;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(watched) = watched {
            self.watched = watched;
        }
        self
    }
}

/// What a save action targets, resolved before the controller sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    NewDraft(MovieForm),
    ExistingRecord { id: i64, form: MovieForm },
}
