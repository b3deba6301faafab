//! Request and response shapes of the line and station services

use serde::{Deserialize, Serialize};

use crate::domain::{LineId, Station, StationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCreateRequest {
    pub name: String,
    pub color: String,
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdateRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCreateRequest {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: i64,
}

impl SectionCreateRequest {
    pub fn new(up_station_id: StationId, down_station_id: StationId, distance: i64) -> Self {
        Self {
            up_station_id,
            down_station_id,
            distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
}

impl From<Station> for StationResponse {
    fn from(station: Station) -> Self {
        Self {
            id: station.id,
            name: station.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResponse {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: u64,
}

/// A line with its stations in up-to-down order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub color: String,
    pub stations: Vec<StationResponse>,
    pub sections: Vec<SectionResponse>,
}

impl LineResponse {
    pub fn station_ids(&self) -> Vec<StationId> {
        self.stations.iter().map(|s| s.id).collect()
    }

    pub fn total_distance(&self) -> u64 {
        self.sections
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.distance))
    }
}
