// Watchlist state: the loaded movies plus the inputs to the displayed view

use crate::filter::{WatchFilter, derive_view};
use crate::movie::{Movie, MovieForm, SaveRequest};
use crate::store::MovieStore;
use crate::validate::{ValidationError, validate_form};
use eyre::Result;
use thiserror::Error;
use tracing::{debug, error};

/// Why a save, toggle or delete did not go through
#[derive(Debug, Error)]
pub enum SaveError {
    /// Input was rejected before the store was touched
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed the write; already logged
    #[error("storage error: {0:#}")]
    Storage(eyre::Report),
}

/// Owns the store handle and the full movie list
///
/// Every write goes through the store and is followed by a full reload, so
/// `records` only ever reflects what the store returned.
pub struct Watchlist {
    store: MovieStore,
    records: Vec<Movie>,
    is_loading: bool,
    search_text: String,
    active_filter: WatchFilter,
}

impl Watchlist {
    /// Wrap a store without loading anything yet
    pub fn new(store: MovieStore) -> Self {
        Self {
            store,
            records: Vec::new(),
            is_loading: false,
            search_text: String::new(),
            active_filter: WatchFilter::All,
        }
    }

    /// Wrap a store and load it
    pub fn load(store: MovieStore) -> Self {
        let mut watchlist = Self::new(store);
        let _ = watchlist.reload();
        watchlist
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    /// Give the store handle back, e.g. to close it
    pub fn into_store(self) -> MovieStore {
        self.store
    }

    /// Full list, newest first
    pub fn records(&self) -> &[Movie] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_filter(&self) -> WatchFilter {
        self.active_filter
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_filter(&mut self, filter: WatchFilter) {
        self.active_filter = filter;
    }

    /// The movies to display for the current search and filter
    pub fn view(&self) -> Vec<&Movie> {
        derive_view(&self.records, &self.search_text, self.active_filter)
    }

    /// Movie currently loaded with this id
    pub fn find(&self, id: i64) -> Option<&Movie> {
        self.records.iter().find(|m| m.id == id)
    }

    /// Re-read everything from the store
    ///
    /// On failure the error is logged and returned, `records` keeps its
    /// previous contents, and loading is cleared either way.
    pub fn reload(&mut self) -> Result<()> {
        self.is_loading = true;

        let result = self.store.initialize().and_then(|_| self.store.list_all());

        self.is_loading = false;

        match result {
            Ok(movies) => {
                debug!(count = movies.len(), "Reloaded movies");
                self.records = movies;
                Ok(())
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "Failed to load movies");
                Err(err)
            }
        }
    }

    /// Validate and store a new movie
    pub fn create(&mut self, form: &MovieForm) -> Result<(), SaveError> {
        let draft = validate_form(form)?;
        self.write_then_reload("create", |store| store.insert(&draft))
    }

    /// Validate and apply changes to an existing movie
    pub fn edit(&mut self, id: i64, form: &MovieForm) -> Result<(), SaveError> {
        let fields = validate_form(form)?;

        let created_at = self.find(id).map(|m| m.created_at).unwrap_or_default();
        let movie = Movie {
            id,
            title: fields.title,
            year: fields.year,
            watched: fields.watched,
            rating: fields.rating,
            created_at,
        };

        self.write_then_reload("edit", |store| store.update(&movie))
    }

    /// Create or edit depending on what the request targets
    pub fn save(&mut self, request: SaveRequest) -> Result<(), SaveError> {
        match request {
            SaveRequest::NewDraft(form) => self.create(&form),
            SaveRequest::ExistingRecord { id, form } => self.edit(id, &form),
        }
    }

    /// Delete a movie; there is no undo
    pub fn remove(&mut self, id: i64) -> Result<(), SaveError> {
        self.write_then_reload("remove", |store| store.delete(id))
    }

    /// Flip watched, based on the value the caller last saw
    pub fn toggle(&mut self, id: i64, current_watched: i64) -> Result<(), SaveError> {
        self.write_then_reload("toggle", |store| store.toggle_watched(id, current_watched))
    }

    fn write_then_reload<F>(&mut self, action: &str, write: F) -> Result<(), SaveError>
    where
        F: FnOnce(&MovieStore) -> Result<()>,
    {
        if let Err(err) = write(&self.store) {
            error!(action, error = %format!("{err:#}"), "Storage write failed");
            return Err(SaveError::Storage(err));
        }

        // The write landed; a failed reload is logged and leaves the old list
        let _ = self.reload();
        Ok(())
    }
}
