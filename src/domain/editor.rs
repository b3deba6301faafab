//! Chain editor: insert and remove as pure transforms over a `SectionChain`.
//!
//! Both operations validate the request completely before building anything,
//! and return a fresh chain; the input chain is never modified.

use tracing::trace;

use crate::domain::chain::SectionChain;
use crate::domain::entities::{Distance, Section, StationId};
use crate::domain::error::DomainError;

/// Where a new section attaches to the existing chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// `up` is the down-terminal: the section is appended.
    ExtendDown,
    /// `down` is the up-terminal: the section is prepended.
    ExtendUp,
    /// `up` is on the line: the section leaving `up` (at `index`) is split.
    SplitFromUp { index: usize },
    /// `down` is on the line: the section arriving at `down` (at `index`) is split.
    SplitFromDown { index: usize },
}

/// Which part of the chain a removal touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    UpTerminal,
    DownTerminal,
    /// The station sits between the sections at `index` and `index + 1`.
    Interior { index: usize },
}

/// Decide where `(up, down)` goes without touching the chain.
pub fn classify_insert(
    chain: &SectionChain,
    up: StationId,
    down: StationId,
) -> Result<Placement, DomainError> {
    match (chain.contains(up), chain.contains(down)) {
        (true, true) => Err(DomainError::DuplicateSection),
        (false, false) => Err(DomainError::DisconnectedSection),
        (true, false) if up == chain.down_terminal() => Ok(Placement::ExtendDown),
        (false, true) if down == chain.up_terminal() => Ok(Placement::ExtendUp),
        (true, false) => chain
            .outgoing_index(up)
            .map(|index| Placement::SplitFromUp { index })
            .ok_or_else(|| DomainError::inconsistent(format!("station {up} has no outgoing section"))),
        (false, true) => chain
            .incoming_index(down)
            .map(|index| Placement::SplitFromDown { index })
            .ok_or_else(|| {
                DomainError::inconsistent(format!("station {down} has no incoming section"))
            }),
    }
}

/// Insert the section `up -> down` of length `distance`.
///
/// Validation order: distance, both-present, none-present, then the split
/// distance check. A split keeps the total length of the section it divides.
pub fn insert(
    chain: &SectionChain,
    up: StationId,
    down: StationId,
    distance: i64,
) -> Result<SectionChain, DomainError> {
    let distance = Distance::new(distance)?;
    let placement = classify_insert(chain, up, down)?;
    trace!(?placement, %up, %down, %distance, "insert");

    let existing = chain.sections();
    let added = Section::new(up, down, distance);
    let mut sections = Vec::with_capacity(existing.len() + 1);

    match placement {
        Placement::ExtendDown => {
            sections.extend_from_slice(existing);
            sections.push(added);
        }
        Placement::ExtendUp => {
            sections.push(added);
            sections.extend_from_slice(existing);
        }
        Placement::SplitFromUp { index } => {
            let split = existing[index];
            let rest = split
                .distance
                .checked_sub(distance)
                .ok_or(DomainError::DistanceExceeded)?;
            sections.extend_from_slice(&existing[..index]);
            sections.push(added);
            sections.push(Section::new(down, split.down, rest));
            sections.extend_from_slice(&existing[index + 1..]);
        }
        Placement::SplitFromDown { index } => {
            let split = existing[index];
            let rest = split
                .distance
                .checked_sub(distance)
                .ok_or(DomainError::DistanceExceeded)?;
            sections.extend_from_slice(&existing[..index]);
            sections.push(Section::new(split.up, up, rest));
            sections.push(added);
            sections.extend_from_slice(&existing[index + 1..]);
        }
    }

    SectionChain::from_ordered(sections)
}

/// Decide how removing `station` changes the chain without touching it.
pub fn classify_remove(chain: &SectionChain, station: StationId) -> Result<Removal, DomainError> {
    if chain.section_count() == 1 {
        return Err(DomainError::SingleSectionDeletion);
    }
    if !chain.contains(station) {
        return Err(DomainError::StationNotFound(station));
    }
    if station == chain.up_terminal() {
        return Ok(Removal::UpTerminal);
    }
    if station == chain.down_terminal() {
        return Ok(Removal::DownTerminal);
    }
    chain
        .incoming_index(station)
        .map(|index| Removal::Interior { index })
        .ok_or_else(|| DomainError::inconsistent(format!("station {station} has no incoming section")))
}

/// Remove `station` from the line.
///
/// Terminals drop their only section; an interior station merges its two
/// sections into one whose length is their sum.
pub fn remove(chain: &SectionChain, station: StationId) -> Result<SectionChain, DomainError> {
    let removal = classify_remove(chain, station)?;
    trace!(?removal, %station, "remove");

    let existing = chain.sections();
    let sections = match removal {
        Removal::UpTerminal => existing[1..].to_vec(),
        Removal::DownTerminal => existing[..existing.len() - 1].to_vec(),
        Removal::Interior { index } => {
            let (before, after) = (existing[index], existing[index + 1]);
            let mut sections = Vec::with_capacity(existing.len() - 1);
            sections.extend_from_slice(&existing[..index]);
            sections.push(Section::new(
                before.up,
                after.down,
                before.distance.join(after.distance),
            ));
            sections.extend_from_slice(&existing[index + 2..]);
            sections
        }
    };

    SectionChain::from_ordered(sections)
}
