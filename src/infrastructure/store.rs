//! Station and line storage
//!
//! `Store` keeps everything in memory behind a lock and, when opened on a
//! file, makes every change a transaction against that file: take an exclusive
//! lock on `<file>.lock`, re-read the document, apply the change, write the
//! whole document back atomically, release. Several processes can therefore
//! share one store file without losing each other's edits.
//!
//! Sections are stored per line as an unordered list of `{ up, down, distance }`
//! triples; the chain order is recovered on load.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Distance, Line, LineId, Section, SectionChain, Station, StationId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{
    FileSystem, LineEdit, LineRepository, LineSnapshot, StationRepository,
};

/// On-disk document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Document {
    next_station_id: u64,
    next_line_id: u64,
    stations: Vec<Station>,
    lines: Vec<LineRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LineRecord {
    id: LineId,
    name: String,
    color: String,
    sections: Vec<SectionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SectionRecord {
    up: StationId,
    down: StationId,
    distance: Distance,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_station_id: u64,
    next_line_id: u64,
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, Line>,
}

impl State {
    fn empty() -> Self {
        Self {
            next_station_id: 1,
            next_line_id: 1,
            ..Self::default()
        }
    }

    fn from_document(doc: Document) -> Result<Self, String> {
        let mut stations = BTreeMap::new();
        for station in doc.stations {
            if stations.insert(station.id, station.clone()).is_some() {
                return Err(format!("duplicate station id {}", station.id));
            }
        }

        let mut lines = BTreeMap::new();
        for record in doc.lines {
            let sections = record
                .sections
                .iter()
                .map(|s| Section::new(s.up, s.down, s.distance));
            let chain = SectionChain::from_sections(sections)
                .map_err(|e| format!("line {}: {}", record.id, e))?;
            if let Some(missing) = chain
                .sections()
                .iter()
                .flat_map(|s| [s.up, s.down])
                .find(|id| !stations.contains_key(id))
            {
                return Err(format!("line {} references unknown station {}", record.id, missing));
            }
            let id = record.id;
            if lines
                .insert(id, Line::with_chain(id, record.name, record.color, chain))
                .is_some()
            {
                return Err(format!("duplicate line id {id}"));
            }
        }

        // Never hand out an id that is already taken, even if the counters were edited by hand.
        let next_station_id = stations
            .keys()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(doc.next_station_id);
        let next_line_id = lines
            .keys()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(doc.next_line_id);

        Ok(Self {
            next_station_id,
            next_line_id,
            stations,
            lines,
        })
    }

    fn to_document(&self) -> Document {
        Document {
            next_station_id: self.next_station_id,
            next_line_id: self.next_line_id,
            stations: self.stations.values().cloned().collect(),
            lines: self
                .lines
                .values()
                .map(|line| LineRecord {
                    id: line.id,
                    name: line.name.clone(),
                    color: line.color.clone(),
                    sections: line
                        .chain()
                        .sections()
                        .iter()
                        .map(|s| SectionRecord {
                            up: s.up,
                            down: s.down,
                            distance: s.distance,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// The line with its stations resolved; fails if any station is missing.
    fn snapshot(&self, line: &Line) -> ApplicationResult<LineSnapshot> {
        let stations = line
            .ordered_stations()?
            .into_iter()
            .map(|id| {
                self.stations
                    .get(&id)
                    .cloned()
                    .ok_or(ApplicationError::UnknownStation(id))
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        Ok(LineSnapshot {
            line: line.clone(),
            stations,
        })
    }
}

/// `/data/subway.toml` -> `/data/subway.toml.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("subway.toml"));
    name.push(".lock");
    path.with_file_name(name)
}

struct Backing {
    path: PathBuf,
    lock_path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl Backing {
    fn new(path: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.to_path_buf(),
            lock_path: lock_path_for(path),
            fs,
        }
    }

    /// Current file content, `None` if the file does not exist yet.
    fn read(&self) -> InfraResult<Option<State>> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read {}", self.path.display()), e))?;
        let doc: Document = toml::from_str(&content).map_err(|e| self.invalid(e.to_string()))?;
        State::from_document(doc)
            .map(Some)
            .map_err(|message| self.invalid(message))
    }

    fn invalid(&self, message: String) -> InfraError {
        InfraError::Store {
            path: self.path.clone(),
            message,
        }
    }

    fn write(&self, state: &State) -> ApplicationResult<()> {
        let content =
            toml::to_string_pretty(&state.to_document()).map_err(|e| ApplicationError::Storage {
                context: format!("serialize {}", self.path.display()),
                source: Box::new(e),
            })?;
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write store", &self.path)?;
        debug!("flushed store to {}", self.path.display());
        Ok(())
    }

    /// Lock file guarding read-modify-write cycles on the store file. The store
    /// file itself is replaced on every write, so it cannot carry the lock.
    fn lock_file(&self) -> ApplicationResult<File> {
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create store directory", &self.path)?;
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .with_path_context("open store lock", &self.lock_path)
    }
}

/// Repository implementation for stations and lines.
pub struct Store {
    state: RwLock<State>,
    backing: Option<Backing>,
}

impl Store {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::empty()),
            backing: None,
        }
    }

    /// Open the store file at `path`, starting empty if it does not exist yet.
    pub fn open(path: &Path, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let backing = Backing::new(path, fs);
        let state = match backing.read()? {
            Some(state) => state,
            None => {
                debug!("store file {} does not exist, starting empty", path.display());
                State::empty()
            }
        };
        info!(
            "opened store {}: {} stations, {} lines",
            path.display(),
            state.stations.len(),
            state.lines.len()
        );

        Ok(Self {
            state: RwLock::new(state),
            backing: Some(backing),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.backing.as_ref().map(|b| b.path.as_path())
    }

    /// Run `change` as a transaction and publish its result.
    ///
    /// File-backed stores hold the exclusive file lock for the whole cycle and
    /// apply `change` to the state as currently on disk. A failed change or a
    /// failed write leaves the file untouched; memory then holds what is on disk.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut State) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let Some(backing) = &self.backing else {
            let mut state = self.state.write();
            let mut next = state.clone();
            let value = change(&mut next)?;
            *state = next;
            return Ok(value);
        };

        let mut lock = fd_lock::RwLock::new(backing.lock_file()?);
        let _exclusive = lock
            .write()
            .with_path_context("lock store", &backing.lock_path)?;
        let mut state = self.state.write();

        // another process may have committed since this one last read the file
        let current = match backing.read() {
            Ok(Some(current)) => current,
            Ok(None) => state.clone(),
            Err(e) => {
                return Err(ApplicationError::Storage {
                    context: format!("reload {}", backing.path.display()),
                    source: Box::new(e),
                })
            }
        };
        let mut next = current.clone();
        let committed = change(&mut next).and_then(|value| backing.write(&next).map(|()| value));
        match committed {
            Ok(value) => {
                *state = next;
                Ok(value)
            }
            Err(e) => {
                *state = current;
                Err(e)
            }
        }
    }
}

impl StationRepository for Store {
    fn create_station(&self, name: &str) -> ApplicationResult<Station> {
        self.update(|state| {
            let station = Station {
                id: StationId(state.next_station_id),
                name: name.to_string(),
            };
            state.next_station_id += 1;
            state.stations.insert(station.id, station.clone());
            Ok(station)
        })
    }

    fn find_station(&self, id: StationId) -> ApplicationResult<Option<Station>> {
        Ok(self.state.read().stations.get(&id).cloned())
    }

    fn find_all_stations(&self) -> ApplicationResult<Vec<Station>> {
        Ok(self.state.read().stations.values().cloned().collect())
    }

    fn delete_station(&self, id: StationId) -> ApplicationResult<bool> {
        self.update(|state| {
            if let Some(line) = state.lines.values().find(|line| line.chain().contains(id)) {
                return Err(ApplicationError::StationInUse(id, line.id));
            }
            Ok(state.stations.remove(&id).is_some())
        })
    }
}

impl LineRepository for Store {
    fn create_line(
        &self,
        build: &mut dyn FnMut(LineId) -> ApplicationResult<Line>,
    ) -> ApplicationResult<LineSnapshot> {
        self.update(|state| {
            let id = LineId(state.next_line_id);
            let line = build(id)?;
            let snapshot = state.snapshot(&line)?;
            state.next_line_id += 1;
            state.lines.insert(id, line);
            Ok(snapshot)
        })
    }

    fn find_line(&self, id: LineId) -> ApplicationResult<Option<LineSnapshot>> {
        let state = self.state.read();
        state.lines.get(&id).map(|line| state.snapshot(line)).transpose()
    }

    fn find_all_lines(&self) -> ApplicationResult<Vec<LineSnapshot>> {
        let state = self.state.read();
        state.lines.values().map(|line| state.snapshot(line)).collect()
    }

    fn modify_line(&self, id: LineId, edit: LineEdit<'_>) -> ApplicationResult<LineSnapshot> {
        self.update(|state| {
            let mut line = state
                .lines
                .get(&id)
                .cloned()
                .ok_or(ApplicationError::LineNotFound(id))?;
            edit(&mut line)?;
            let snapshot = state.snapshot(&line)?;
            state.lines.insert(id, line);
            Ok(snapshot)
        })
    }

    fn delete_line(&self, id: LineId) -> ApplicationResult<bool> {
        self.update(|state| Ok(state.lines.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_memory_store_when_creating_stations_then_ids_increase() {
        let store = Store::in_memory();

        let a = store.create_station("잠실역").unwrap();
        let b = store.create_station("용산역").unwrap();

        assert_eq!(a.id, StationId(1));
        assert_eq!(b.id, StationId(2));
        assert_eq!(store.find_all_stations().unwrap().len(), 2);
        assert!(store.path().is_none());
    }

    #[test]
    fn given_document_with_unordered_sections_when_loading_then_chain_is_ordered() {
        let doc: Document = toml::from_str(
            r#"
next_station_id = 4
next_line_id = 2

[[stations]]
id = 1
name = "잠실역"

[[stations]]
id = 2
name = "용산역"

[[stations]]
id = 3
name = "건대입구역"

[[lines]]
id = 1
name = "2호선"
color = "green"

[[lines.sections]]
up = 2
down = 3
distance = 5

[[lines.sections]]
up = 1
down = 2
distance = 10
"#,
        )
        .unwrap();

        let state = State::from_document(doc).unwrap();
        let line = &state.lines[&LineId(1)];

        assert_eq!(
            line.ordered_stations().unwrap(),
            vec![StationId(1), StationId(2), StationId(3)]
        );
    }

    #[test]
    fn given_line_with_unknown_station_when_loading_then_rejected() {
        let doc: Document = toml::from_str(
            r#"
[[stations]]
id = 1
name = "잠실역"

[[lines]]
id = 1
name = "2호선"
color = "green"

[[lines.sections]]
up = 1
down = 2
distance = 10
"#,
        )
        .unwrap();

        let err = State::from_document(doc).unwrap_err();
        assert!(err.contains("unknown station 2"), "{err}");
    }

    #[test]
    fn given_zero_distance_when_parsing_then_rejected() {
        let result: Result<Document, _> = toml::from_str(
            r#"
[[lines]]
id = 1
name = "2호선"
color = "green"

[[lines.sections]]
up = 1
down = 2
distance = 0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn given_stale_counters_when_loading_then_ids_stay_unique() {
        let doc: Document = toml::from_str(
            r#"
next_station_id = 1

[[stations]]
id = 7
name = "성수역"
"#,
        )
        .unwrap();

        let state = State::from_document(doc).unwrap();
        assert_eq!(state.next_station_id, 8);
        assert_eq!(state.next_line_id, 1);
    }

    #[test]
    fn given_store_path_when_deriving_lock_path_then_appends_suffix() {
        assert_eq!(
            lock_path_for(Path::new("/data/subway.toml")),
            PathBuf::from("/data/subway.toml.lock")
        );
    }

    #[test]
    fn given_station_on_line_when_deleting_then_in_use_and_kept() {
        let store = Store::in_memory();
        let a = store.create_station("잠실역").unwrap();
        let b = store.create_station("용산역").unwrap();
        let snapshot = store
            .create_line(&mut |id: LineId| Ok(Line::new(id, "2호선", "green", a.id, b.id, 10)?))
            .unwrap();

        let err = store.delete_station(b.id).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::StationInUse(id, line) if id == b.id && line == snapshot.line.id
        ));
        assert!(store.find_station(b.id).unwrap().is_some());
    }

    #[test]
    fn given_line_with_unknown_station_when_creating_then_nothing_stored() {
        let store = Store::in_memory();
        let a = store.create_station("잠실역").unwrap();

        let err = store
            .create_line(&mut |id: LineId| {
                Ok(Line::new(id, "2호선", "green", a.id, StationId(9), 10)?)
            })
            .unwrap_err();

        assert!(matches!(err, ApplicationError::UnknownStation(StationId(9))));
        assert!(store.find_all_lines().unwrap().is_empty());
        let b = store.create_station("용산역").unwrap();
        let created = store
            .create_line(&mut |id: LineId| Ok(Line::new(id, "2호선", "green", a.id, b.id, 10)?))
            .unwrap();
        assert_eq!(created.line.id, LineId(1));
        assert_eq!(created.stations, vec![a, b]);
    }
}
