//! Station directory service

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::dto::StationResponse;
use crate::application::status::Response;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::StationId;
use crate::infrastructure::traits::StationRepository;

pub struct StationService {
    stations: Arc<dyn StationRepository>,
}

impl StationService {
    pub fn new(stations: Arc<dyn StationRepository>) -> Self {
        Self { stations }
    }

    pub fn create_station(&self, name: &str) -> ApplicationResult<Response<StationResponse>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApplicationError::EmptyName);
        }
        let station = self.stations.create_station(name)?;
        info!("created station {} ({})", station.id, station.name);
        Ok(Response::created(station.into()))
    }

    pub fn find_station(&self, id: StationId) -> ApplicationResult<Response<StationResponse>> {
        self.stations
            .find_station(id)?
            .map(|s| Response::ok(s.into()))
            .ok_or(ApplicationError::UnknownStation(id))
    }

    pub fn find_all_stations(&self) -> ApplicationResult<Response<Vec<StationResponse>>> {
        let stations = self
            .stations
            .find_all_stations()?
            .into_iter()
            .map(StationResponse::from)
            .collect();
        Ok(Response::ok(stations))
    }

    /// Delete a station that no line uses any more.
    pub fn delete_station(&self, id: StationId) -> ApplicationResult<Response<()>> {
        debug!("delete_station: id={}", id);
        // the repository refuses with StationInUse while a line still holds the station
        if !self.stations.delete_station(id)? {
            return Err(ApplicationError::UnknownStation(id));
        }
        info!("deleted station {}", id);
        Ok(Response::no_content())
    }
}
