//! Section chain: the ordered, single-path topology of one line.
//!
//! Sections are kept in up-to-down order together with two lookup tables
//! (station -> index of its outgoing section, station -> index of its incoming
//! section). Every constructor checks the path invariants, so a value of this
//! type is always a well-formed chain.

use std::collections::{HashMap, HashSet};
use std::fmt;

use itertools::Itertools;

use crate::domain::entities::{Section, StationId};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChain {
    sections: Vec<Section>,
    outgoing: HashMap<StationId, usize>,
    incoming: HashMap<StationId, usize>,
}

impl SectionChain {
    /// Chain made of a line's first section.
    pub fn new(first: Section) -> Result<Self, DomainError> {
        if first.up == first.down {
            return Err(DomainError::IdenticalEndpoints(first.up));
        }
        Self::from_ordered(vec![first])
    }

    /// Rebuild a chain from sections in any order.
    ///
    /// Storage keeps sections as an unordered set of triples; the order is
    /// recovered here by following down links from the only station that is
    /// never a down endpoint.
    pub fn from_sections<I>(sections: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = Section>,
    {
        let sections: Vec<Section> = sections.into_iter().collect();
        if sections.is_empty() {
            return Err(DomainError::inconsistent("a line needs at least one section"));
        }

        let mut by_up: HashMap<StationId, Section> = HashMap::with_capacity(sections.len());
        let mut downs: HashSet<StationId> = HashSet::with_capacity(sections.len());
        for section in &sections {
            if by_up.insert(section.up, *section).is_some() {
                return Err(DomainError::inconsistent(format!(
                    "station {} has more than one outgoing section",
                    section.up
                )));
            }
            if !downs.insert(section.down) {
                return Err(DomainError::inconsistent(format!(
                    "station {} has more than one incoming section",
                    section.down
                )));
            }
        }

        let heads: Vec<StationId> = by_up
            .keys()
            .filter(|station| !downs.contains(station))
            .copied()
            .collect();
        let head = match heads.as_slice() {
            [head] => *head,
            [] => return Err(DomainError::inconsistent("sections form a cycle")),
            _ => {
                return Err(DomainError::inconsistent(format!(
                    "sections form {} separate paths",
                    heads.len()
                )))
            }
        };

        let mut ordered = Vec::with_capacity(sections.len());
        let mut current = head;
        while let Some(section) = by_up.remove(&current) {
            ordered.push(section);
            current = section.down;
        }
        if !by_up.is_empty() {
            return Err(DomainError::inconsistent(
                "sections are not connected into a single path",
            ));
        }

        Self::from_ordered(ordered)
    }

    /// Build from sections already in up-to-down order, checking every invariant.
    pub(crate) fn from_ordered(sections: Vec<Section>) -> Result<Self, DomainError> {
        let mut outgoing = HashMap::with_capacity(sections.len());
        let mut incoming = HashMap::with_capacity(sections.len());
        for (idx, section) in sections.iter().enumerate() {
            outgoing.insert(section.up, idx);
            incoming.insert(section.down, idx);
        }
        let chain = Self {
            sections,
            outgoing,
            incoming,
        };
        chain.validate()?;
        Ok(chain)
    }

    /// Check non-emptiness, contiguity, station uniqueness and the simple-path shape.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sections.is_empty() {
            return Err(DomainError::inconsistent("a line needs at least one section"));
        }
        if let Some((a, b)) = self
            .sections
            .iter()
            .tuple_windows()
            .find(|(a, b)| a.down != b.up)
        {
            return Err(DomainError::inconsistent(format!(
                "section {}->{} is followed by {}->{} instead of a section starting at {}",
                a.up, a.down, b.up, b.down, a.down
            )));
        }
        let stations = self.walk_stored();
        if !stations.iter().all_unique() {
            return Err(DomainError::inconsistent("a station appears more than once"));
        }
        if self.outgoing.len() != self.sections.len() || self.incoming.len() != self.sections.len()
        {
            return Err(DomainError::inconsistent("station index out of sync"));
        }
        Ok(())
    }

    /// Stations from the up-terminal to the down-terminal, following down links.
    ///
    /// Fails only when the chain is internally inconsistent.
    pub fn ordered_stations(&self) -> Result<Vec<StationId>, DomainError> {
        let limit = self.sections.len() + 1;
        let mut stations = Vec::with_capacity(limit);
        let mut current = self.up_terminal();
        stations.push(current);
        while let Some(section) = self.outgoing(current) {
            if stations.len() == limit {
                return Err(DomainError::inconsistent("down links loop back"));
            }
            current = section.down;
            stations.push(current);
        }
        if stations.len() != limit {
            return Err(DomainError::inconsistent(format!(
                "walk reached {} of {} stations",
                stations.len(),
                limit
            )));
        }
        Ok(stations)
    }

    /// True iff the station is an up or down endpoint of any section.
    pub fn contains(&self, station: StationId) -> bool {
        self.outgoing.contains_key(&station) || self.incoming.contains_key(&station)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Sections in up-to-down order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn up_terminal(&self) -> StationId {
        self.sections[0].up
    }

    pub fn down_terminal(&self) -> StationId {
        self.sections[self.sections.len() - 1].down
    }

    /// Section leaving `station`, if any.
    pub fn outgoing(&self, station: StationId) -> Option<&Section> {
        self.outgoing_index(station).map(|idx| &self.sections[idx])
    }

    /// Section arriving at `station`, if any.
    pub fn incoming(&self, station: StationId) -> Option<&Section> {
        self.incoming_index(station).map(|idx| &self.sections[idx])
    }

    pub fn total_distance(&self) -> u64 {
        self.sections
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.distance.get()))
    }

    pub(crate) fn outgoing_index(&self, station: StationId) -> Option<usize> {
        self.outgoing.get(&station).copied()
    }

    pub(crate) fn incoming_index(&self, station: StationId) -> Option<usize> {
        self.incoming.get(&station).copied()
    }

    // Stations read straight off the stored order, without the index.
    fn walk_stored(&self) -> Vec<StationId> {
        std::iter::once(self.sections[0].up)
            .chain(self.sections.iter().map(|s| s.down))
            .collect()
    }
}

impl fmt::Display for SectionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.up_terminal())?;
        for section in &self.sections {
            write!(f, " -({})-> {}", section.distance, section.down)?;
        }
        Ok(())
    }
}
