//! Line service
//!
//! Runs the chain editor on a line inside a repository transaction. Every
//! mutation of a line also holds that line's lock, so two edits of the same
//! line in one process queue up in order; different lines do not contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::application::dto::{
    LineCreateRequest, LineResponse, LineUpdateRequest, SectionCreateRequest, SectionResponse,
    StationResponse,
};
use crate::application::status::Response;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Line, LineId, StationId};
use crate::infrastructure::traits::{LineRepository, LineSnapshot, StationRepository};

/// One mutex per line, created on first use and dropped when the line is deleted.
#[derive(Default)]
pub struct LineLocks {
    locks: Mutex<HashMap<LineId, Arc<Mutex<()>>>>,
}

impl LineLocks {
    /// Lock handle for `id`; hold `handle.lock()` for the whole load-edit-store cycle.
    pub fn handle(&self, id: LineId) -> Arc<Mutex<()>> {
        self.locks.lock().entry(id).or_default().clone()
    }

    /// Forget the lock of `id` unless another caller still holds its handle.
    pub fn release(&self, id: LineId) {
        let mut locks = self.locks.lock();
        if locks.get(&id).is_some_and(|handle| Arc::strong_count(handle) == 1) {
            locks.remove(&id);
        }
    }

    /// Number of lines that currently have a lock.
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Service for line topology edits.
pub struct LineService {
    stations: Arc<dyn StationRepository>,
    lines: Arc<dyn LineRepository>,
    locks: LineLocks,
}

impl LineService {
    /// Create a new line service.
    pub fn new(stations: Arc<dyn StationRepository>, lines: Arc<dyn LineRepository>) -> Self {
        Self {
            stations,
            lines,
            locks: LineLocks::default(),
        }
    }

    /// Create a line with its first section.
    pub fn create_line(
        &self,
        request: &LineCreateRequest,
    ) -> ApplicationResult<Response<LineResponse>> {
        debug!(
            "create_line: name={} up={} down={} distance={}",
            request.name, request.up_station_id, request.down_station_id, request.distance
        );
        self.require_station(request.up_station_id)?;
        self.require_station(request.down_station_id)?;

        let snapshot = self.lines.create_line(&mut |id: LineId| {
            Ok(Line::new(
                id,
                request.name.clone(),
                request.color.clone(),
                request.up_station_id,
                request.down_station_id,
                request.distance,
            )?)
        })?;
        info!("created line {} ({})", snapshot.line.id, snapshot.line.name);

        Ok(Response::created(to_response(&snapshot)))
    }

    pub fn find_line(&self, id: LineId) -> ApplicationResult<Response<LineResponse>> {
        let snapshot = self.load_line(id)?;
        Ok(Response::ok(to_response(&snapshot)))
    }

    pub fn find_all_lines(&self) -> ApplicationResult<Response<Vec<LineResponse>>> {
        let lines = self.lines.find_all_lines()?.iter().map(to_response).collect();
        Ok(Response::ok(lines))
    }

    /// Rename or recolor a line. Topology is not touched.
    pub fn update_line(
        &self,
        id: LineId,
        request: &LineUpdateRequest,
    ) -> ApplicationResult<Response<LineResponse>> {
        let handle = self.locks.handle(id);
        let _guard = handle.lock();

        let snapshot = self.lines.modify_line(id, &mut |line: &mut Line| {
            if let Some(name) = &request.name {
                line.name = name.clone();
            }
            if let Some(color) = &request.color {
                line.color = color.clone();
            }
            Ok(())
        })?;
        debug!("updated line {}", id);

        Ok(Response::ok(to_response(&snapshot)))
    }

    pub fn delete_line(&self, id: LineId) -> ApplicationResult<Response<()>> {
        let deleted = {
            let handle = self.locks.handle(id);
            let _guard = handle.lock();
            self.lines.delete_line(id)
        };
        self.locks.release(id);

        if !deleted? {
            return Err(ApplicationError::LineNotFound(id));
        }
        info!("deleted line {}", id);
        Ok(Response::no_content())
    }

    /// Add a section to a line: extend at either terminal or split an existing section.
    pub fn add_section(
        &self,
        id: LineId,
        request: &SectionCreateRequest,
    ) -> ApplicationResult<Response<LineResponse>> {
        debug!(
            "add_section: line={} up={} down={} distance={}",
            id, request.up_station_id, request.down_station_id, request.distance
        );
        let handle = self.locks.handle(id);
        let _guard = handle.lock();

        self.load_line(id)?;
        self.require_station(request.up_station_id)?;
        self.require_station(request.down_station_id)?;

        // the store resolves every station again when it commits
        let snapshot = self.lines.modify_line(id, &mut |line: &mut Line| {
            line.add_section(request.up_station_id, request.down_station_id, request.distance)
                .map_err(|e| {
                    warn!("add_section rejected on line {}: {}", id, e);
                    e.into()
                })
        })?;
        info!("line {}: {}", id, snapshot.line.chain());

        Ok(Response::created(to_response(&snapshot)))
    }

    /// Remove a station from a line, re-linking its neighbours.
    pub fn remove_section(
        &self,
        id: LineId,
        station: StationId,
    ) -> ApplicationResult<Response<()>> {
        debug!("remove_section: line={} station={}", id, station);
        let handle = self.locks.handle(id);
        let _guard = handle.lock();

        let snapshot = self.lines.modify_line(id, &mut |line: &mut Line| {
            line.remove_station(station).map_err(|e| {
                warn!("remove_section rejected on line {}: {}", id, e);
                e.into()
            })
        })?;
        info!("line {}: {}", id, snapshot.line.chain());

        Ok(Response::no_content())
    }

    fn load_line(&self, id: LineId) -> ApplicationResult<LineSnapshot> {
        self.lines
            .find_line(id)?
            .ok_or(ApplicationError::LineNotFound(id))
    }

    fn require_station(&self, id: StationId) -> ApplicationResult<()> {
        match self.stations.find_station(id)? {
            Some(_) => Ok(()),
            None => Err(ApplicationError::UnknownStation(id)),
        }
    }
}

fn to_response(snapshot: &LineSnapshot) -> LineResponse {
    let line = &snapshot.line;
    LineResponse {
        id: line.id,
        name: line.name.clone(),
        color: line.color.clone(),
        stations: snapshot
            .stations
            .iter()
            .cloned()
            .map(StationResponse::from)
            .collect(),
        sections: line
            .chain()
            .sections()
            .iter()
            .map(|s| SectionResponse {
                up_station_id: s.up,
                down_station_id: s.down,
                distance: s.distance.get(),
            })
            .collect(),
    }
}
