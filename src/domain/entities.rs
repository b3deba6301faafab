//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::chain::SectionChain;
use crate::domain::editor;
use crate::domain::error::DomainError;

/// Station identifier, allocated by the station directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named station. Owned by the station directory; lines only reference its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
}

/// Length of a section. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Distance(u64);

impl Distance {
    /// Validate a requested distance.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidDistance(value));
        }
        Ok(Self(value.unsigned_abs()))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Remaining length after cutting `part` off the front of `self`.
    /// `None` unless `part` is strictly shorter.
    pub fn checked_sub(self, part: Distance) -> Option<Distance> {
        if part.0 < self.0 {
            Some(Distance(self.0 - part.0))
        } else {
            None
        }
    }

    /// Length of two sections joined end to end.
    pub fn join(self, other: Distance) -> Distance {
        Distance(self.0.saturating_add(other.0))
    }
}

impl<'de> Deserialize<'de> for Distance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        if raw == 0 {
            return Err(serde::de::Error::custom("section distance must be positive"));
        }
        Ok(Distance(raw))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directed edge `up -> down` of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section {
    pub up: StationId,
    pub down: StationId,
    pub distance: Distance,
}

impl Section {
    pub fn new(up: StationId, down: StationId, distance: Distance) -> Self {
        Self { up, down, distance }
    }
}

/// A subway line. The chain is the only topology a line has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub color: String,
    chain: SectionChain,
}

impl Line {
    /// Create a line with its first section.
    pub fn new(
        id: LineId,
        name: impl Into<String>,
        color: impl Into<String>,
        up: StationId,
        down: StationId,
        distance: i64,
    ) -> Result<Self, DomainError> {
        let distance = Distance::new(distance)?;
        let chain = SectionChain::new(Section::new(up, down, distance))?;
        Ok(Self::with_chain(id, name, color, chain))
    }

    /// Rebuild a line from an already validated chain (e.g. loaded from storage).
    pub fn with_chain(
        id: LineId,
        name: impl Into<String>,
        color: impl Into<String>,
        chain: SectionChain,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            chain,
        }
    }

    pub fn chain(&self) -> &SectionChain {
        &self.chain
    }

    /// Insert a section. The line is untouched when the edit is rejected.
    pub fn add_section(
        &mut self,
        up: StationId,
        down: StationId,
        distance: i64,
    ) -> Result<(), DomainError> {
        self.chain = editor::insert(&self.chain, up, down, distance)?;
        Ok(())
    }

    /// Remove a station. The line is untouched when the edit is rejected.
    pub fn remove_station(&mut self, station: StationId) -> Result<(), DomainError> {
        self.chain = editor::remove(&self.chain, station)?;
        Ok(())
    }

    pub fn ordered_stations(&self) -> Result<Vec<StationId>, DomainError> {
        self.chain.ordered_stations()
    }
}
