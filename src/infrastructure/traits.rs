//! I/O boundary traits for testability
//!
//! These traits abstract storage and filesystem access, allowing services
//! to be tested with in-memory or failing implementations.

use std::io;
use std::path::Path;

use crate::application::ApplicationResult;
use crate::domain::{Line, LineId, Station, StationId};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content atomically (temp file in the same directory, then rename).
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Station directory: identity lookups for stations.
pub trait StationRepository: Send + Sync {
    /// Store a new station and allocate its id.
    fn create_station(&self, name: &str) -> ApplicationResult<Station>;

    fn find_station(&self, id: StationId) -> ApplicationResult<Option<Station>>;

    /// All stations, ordered by id.
    fn find_all_stations(&self) -> ApplicationResult<Vec<Station>>;

    /// Returns false if the station did not exist.
    /// Fails with `StationInUse` while any line still contains it; the check and
    /// the removal happen in one step.
    fn delete_station(&self, id: StationId) -> ApplicationResult<bool>;
}

/// A line together with its stations, in up-to-down order, read in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub line: Line,
    pub stations: Vec<Station>,
}

/// Edit applied to a line inside a store transaction.
pub type LineEdit<'a> = &'a mut dyn FnMut(&mut Line) -> ApplicationResult<()>;

/// Line storage.
///
/// Mutations are transactions: the line is loaded, edited and stored as one
/// exclusive step, and every station it references must exist at commit time.
/// A failing edit or reference check stores nothing.
pub trait LineRepository: Send + Sync {
    /// Allocate an id, build the line with it and store it.
    /// The id is only consumed when the line is stored.
    fn create_line(
        &self,
        build: &mut dyn FnMut(LineId) -> ApplicationResult<Line>,
    ) -> ApplicationResult<LineSnapshot>;

    fn find_line(&self, id: LineId) -> ApplicationResult<Option<LineSnapshot>>;

    /// All lines, ordered by id.
    fn find_all_lines(&self) -> ApplicationResult<Vec<LineSnapshot>>;

    /// Load line `id`, run `edit` on it and store the result.
    /// Fails with `LineNotFound` if there is no such line.
    fn modify_line(&self, id: LineId, edit: LineEdit<'_>) -> ApplicationResult<LineSnapshot>;

    /// Returns false if the line did not exist.
    fn delete_line(&self, id: LineId) -> ApplicationResult<bool>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        use std::io::Write;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
