use std::sync::{Arc, OnceLock};

use super::loader::{load_or_empty, DataSource};
use super::model::AuthorTable;

// ---------------------------------------------------------------------------
// Session cache: the full table, loaded at most once
// ---------------------------------------------------------------------------

/// Holds the full author table for one session.
///
/// The first call to [`SessionCache::table`] loads the source; every later
/// call returns the same immutable table.  A new session (new cache) is the
/// only way to load again.
#[derive(Debug)]
pub struct SessionCache {
    source: DataSource,
    slot: OnceLock<Loaded>,
}

#[derive(Debug)]
struct Loaded {
    table: Arc<AuthorTable>,
    error: Option<String>,
}

impl SessionCache {
    pub fn new(source: DataSource) -> Self {
        SessionCache {
            source,
            slot: OnceLock::new(),
        }
    }

    /// Cache that is already populated, e.g. from a table built in memory.
    #[cfg(test)]
    pub fn with_table(source: DataSource, table: AuthorTable) -> Self {
        let cache = Self::new(source);
        let _ = cache.slot.set(Loaded {
            table: Arc::new(table),
            error: None,
        });
        cache
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    fn loaded(&self) -> &Loaded {
        self.slot.get_or_init(|| {
            let (table, error) = load_or_empty(&self.source);
            Loaded {
                table: Arc::new(table),
                error,
            }
        })
    }

    /// The full table, loading it on first access.  Empty if loading failed.
    pub fn table(&self) -> Arc<AuthorTable> {
        Arc::clone(&self.loaded().table)
    }

    /// The load failure message, if the load failed.
    pub fn load_error(&self) -> Option<&str> {
        self.loaded().error.as_deref()
    }
}
