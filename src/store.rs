// SQLite persistence for the movie list

use crate::movie::{Movie, NewMovie};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows inserted when the table is first found empty: (title, year, watched, rating)
const SEED_MOVIES: [(&str, i32, i64, Option<i32>); 3] = [
    ("Inception", 2010, 1, Some(5)),
    ("Interstellar", 2014, 0, None),
    ("The Matrix", 1999, 1, Some(4)),
];

const INSERT_SQL: &str = "INSERT INTO movies (title, year, watched, rating, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Handle to the movie database
///
/// Opened explicitly, passed to whoever needs it, and closed explicitly with
/// [`MovieStore::close`]. Nothing is shared behind a global.
pub struct MovieStore {
    path: Option<PathBuf>,
    db: Connection,
}

impl MovieStore {
    /// Open (or create) a database file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        info!(path = ?path, "Opened movie database");

        Ok(Self {
            path: Some(path.to_path_buf()),
            db,
        })
    }

    /// Open an isolated in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Ok(Self { path: None, db })
    }

    /// Path of the database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.db
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close SQLite database")
    }

    /// Ensure the table exists and seed it when empty
    ///
    /// Safe to call on every start; seeds are only written into an empty table.
    pub fn initialize(&self) -> Result<()> {
        if self.path.is_some() {
            let mode: String = self
                .db
                .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                .context("Failed to enable WAL journal")?;
            debug!(mode = %mode, "Journal mode set");
        }

        self.db
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS movies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                year INTEGER,
                watched INTEGER DEFAULT 0,
                rating INTEGER CHECK(rating BETWEEN 1 AND 5),
                created_at INTEGER NOT NULL
            );
            "#,
            )
            .context("Failed to create movies table")?;

        if self.count()? == 0 {
            info!("Movie table empty, inserting seed rows");
            for (title, year, watched, rating) in SEED_MOVIES {
                self.db
                    .execute(INSERT_SQL, rusqlite::params![title, year, watched, rating, now_ms()])
                    .context("Failed to insert seed movie")?;
            }
        }

        Ok(())
    }

    /// Number of stored movies
    pub fn count(&self) -> Result<i64> {
        let count = self
            .db
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .context("Failed to count movies")?;
        Ok(count)
    }

    /// Store a new movie; the id and creation time are assigned here
    pub fn insert(&self, movie: &NewMovie) -> Result<()> {
        self.db
            .execute(
                INSERT_SQL,
                rusqlite::params![movie.title, movie.year, movie.watched, movie.rating, now_ms()],
            )
            .context("Failed to insert movie")?;

        debug!(id = self.db.last_insert_rowid(), title = %movie.title, "Inserted movie");
        Ok(())
    }

    /// Every movie, newest first
    pub fn list_all(&self) -> Result<Vec<Movie>> {
        let mut stmt = self.db.prepare(
            "SELECT id, title, year, watched, rating, created_at
             FROM movies
             ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], movie_from_row)?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result.context("Failed to read movie row")?);
        }
        Ok(results)
    }

    /// A single movie by id
    pub fn get(&self, id: i64) -> Result<Option<Movie>> {
        let movie = self
            .db
            .query_row(
                "SELECT id, title, year, watched, rating, created_at FROM movies WHERE id = ?1",
                [id],
                movie_from_row,
            )
            .optional()
            .context("Failed to load movie")?;
        Ok(movie)
    }

    /// Overwrite title, year, watched and rating; id and created_at stay put
    pub fn update(&self, movie: &Movie) -> Result<()> {
        let changed = self
            .db
            .execute(
                "UPDATE movies SET title = ?1, year = ?2, watched = ?3, rating = ?4 WHERE id = ?5",
                rusqlite::params![movie.title, movie.year, movie.watched, movie.rating, movie.id],
            )
            .context("Failed to update movie")?;

        debug!(id = movie.id, changed, "Updated movie");
        Ok(())
    }

    /// Flip the watched flag, trusting the caller's view of its current value
    pub fn toggle_watched(&self, id: i64, current: i64) -> Result<()> {
        let next = if current != 0 { 0 } else { 1 };
        let changed = self
            .db
            .execute("UPDATE movies SET watched = ?1 WHERE id = ?2", rusqlite::params![next, id])
            .context("Failed to toggle watched flag")?;

        debug!(id, watched = next, changed, "Toggled movie");
        Ok(())
    }

    /// Remove a movie permanently
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self
            .db
            .execute("DELETE FROM movies WHERE id = ?1", [id])
            .context("Failed to delete movie")?;

        debug!(id, changed, "Deleted movie");
        Ok(())
    }

    /// Whether a movie with exactly this title and year is already stored
    pub fn exists(&self, title: &str, year: i32) -> Result<bool> {
        let count: i64 = self
            .db
            .query_row(
                "SELECT COUNT(*) FROM movies WHERE title = ?1 AND year = ?2",
                rusqlite::params![title, year],
                |row| row.get(0),
            )
            .context("Failed to check for duplicate movie")?;
        Ok(count > 0)
    }
}

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        watched: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        rating: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// Helper function for timestamps
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn memory_store() -> MovieStore {
        let store = MovieStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_open_creates_file_and_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("nested").join("movies.db");

        let store = MovieStore::open(&db_path).unwrap();
        store.initialize().unwrap();

        assert!(db_path.exists());
        assert_eq!(store.path(), Some(db_path.as_path()));
        store.close().unwrap();
    }

    #[test]
    fn test_initialize_seeds_empty_table() {
        let store = memory_store();

        let movies = store.list_all().unwrap();
        assert_eq!(movies.len(), 3);

        let interstellar = movies.iter().find(|m| m.title == "Interstellar").unwrap();
        assert_eq!(interstellar.year, Some(2014));
        assert_eq!(interstellar.watched, 0);
        assert_eq!(interstellar.rating, None);

        let matrix = movies.iter().find(|m| m.title == "The Matrix").unwrap();
        assert_eq!(matrix.watched, 1);
        assert_eq!(matrix.rating, Some(4));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = memory_store();
        store.initialize().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_initialize_does_not_reseed_after_delete_all_but_one() {
        let store = memory_store();
        let movies = store.list_all().unwrap();
        for movie in &movies[1..] {
            store.delete(movie.id).unwrap();
        }

        store.initialize().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("movies.db");

        {
            let store = MovieStore::open(&db_path).unwrap();
            store.initialize().unwrap();
            store.insert(&NewMovie::new("Dune").year(2021)).unwrap();
            store.close().unwrap();
        }

        let store = MovieStore::open(&db_path).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.count().unwrap(), 4);
        assert!(store.exists("Dune", 2021).unwrap());
    }

    #[test]
    fn test_insert_round_trip() {
        let store = memory_store();
        let before = now_ms();

        store.insert(&NewMovie::new("Dune").year(2021).rating(4)).unwrap();

        let movies = store.list_all().unwrap();
        let dune: Vec<_> = movies.iter().filter(|m| m.title == "Dune").collect();
        assert_eq!(dune.len(), 1);
        assert_eq!(dune[0].year, Some(2021));
        assert_eq!(dune[0].rating, Some(4));
        assert_eq!(dune[0].watched, 0);
        assert!(dune[0].created_at >= before);
        assert!(dune[0].id > 0);
    }

    #[test]
    fn test_list_all_newest_first() {
        let store = memory_store();
        store.insert(&NewMovie::new("A")).unwrap();
        store.insert(&NewMovie::new("B")).unwrap();
        store.insert(&NewMovie::new("C")).unwrap();

        let movies = store.list_all().unwrap();
        assert_eq!(&titles(&movies)[..3], &["C", "B", "A"]);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = memory_store();
        store.insert(&NewMovie::new("Temp")).unwrap();
        let temp_id = store.list_all().unwrap()[0].id;
        store.delete(temp_id).unwrap();

        store.insert(&NewMovie::new("Next")).unwrap();
        let next_id = store.list_all().unwrap()[0].id;
        assert!(next_id > temp_id);
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let store = memory_store();
        store.insert(&NewMovie::new("Dune")).unwrap();
        let original = store.list_all().unwrap()[0].clone();

        let changed = Movie {
            title: "Dune: Part One".to_string(),
            year: Some(2021),
            watched: 1,
            rating: Some(5),
            ..original.clone()
        };
        store.update(&changed).unwrap();

        let stored = store.get(original.id).unwrap().unwrap();
        assert_eq!(stored, changed);
        assert_eq!(stored.created_at, original.created_at);
    }

    #[test]
    fn test_update_can_clear_optional_fields() {
        let store = memory_store();
        store.insert(&NewMovie::new("Dune").year(2021).rating(3)).unwrap();
        let mut movie = store.list_all().unwrap()[0].clone();

        movie.year = None;
        movie.rating = None;
        store.update(&movie).unwrap();

        let stored = store.get(movie.id).unwrap().unwrap();
        assert_eq!(stored.year, None);
        assert_eq!(stored.rating, None);
    }

    #[test]
    fn test_toggle_uses_caller_value() {
        let store = memory_store();
        store.insert(&NewMovie::new("Dune")).unwrap();
        let id = store.list_all().unwrap()[0].id;

        store.toggle_watched(id, 0).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().watched, 1);

        store.toggle_watched(id, 1).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().watched, 0);

        // A stale "current" value is believed as-is
        store.toggle_watched(id, 1).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().watched, 0);
    }

    #[test]
    fn test_delete_and_exists() {
        let store = memory_store();
        store.insert(&NewMovie::new("Dune").year(2021)).unwrap();
        assert!(store.exists("Dune", 2021).unwrap());

        let id = store.list_all().unwrap()[0].id;
        store.delete(id).unwrap();

        assert!(store.get(id).unwrap().is_none());
        assert!(!store.exists("Dune", 2021).unwrap());
    }

    #[test]
    fn test_exists_needs_another_match_after_delete() {
        let store = memory_store();
        store.insert(&NewMovie::new("Dune").year(2021)).unwrap();
        store.insert(&NewMovie::new("Dune").year(2021)).unwrap();

        let id = store.list_all().unwrap()[0].id;
        store.delete(id).unwrap();
        assert!(store.exists("Dune", 2021).unwrap());
    }

    #[test]
    fn test_exists_is_exact_and_case_sensitive() {
        let store = memory_store();
        assert!(store.exists("Inception", 2010).unwrap());
        assert!(!store.exists("inception", 2010).unwrap());
        assert!(!store.exists("Inception", 2011).unwrap());
    }

    #[test]
    fn test_missing_id_is_not_an_error() {
        let store = memory_store();
        store.delete(9999).unwrap();
        store.toggle_watched(9999, 0).unwrap();
        assert!(store.get(9999).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_schema_rejects_out_of_range_rating() {
        let store = memory_store();
        let result = store.insert(&NewMovie::new("Bad").rating(9));
        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 3);
    }
}
