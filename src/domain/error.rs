//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::StationId;

/// Domain errors represent rejected topology edits.
/// Each variant carries the canonical message shown to the requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("이미 노선에 등록되어있는 역은 새로운 구간의 하행역이 될 수 없습니다.")]
    DuplicateSection,

    #[error("노선에 연결되지 않는 구간은 등록할 수 없습니다.")]
    DisconnectedSection,

    #[error("기존구간의 거리보다 더 길수 없습니다.")]
    DistanceExceeded,

    #[error("구간의 거리는 0보다 커야 합니다.")]
    InvalidDistance(i64),

    #[error("구간이 1개인 노선의 구간은 삭제할 수 없습니다.")]
    SingleSectionDeletion,

    #[error("노선에 존재하지 않는 역은 삭제할 수 없습니다.")]
    StationNotFound(StationId),

    #[error("상행역과 하행역은 같은 역일 수 없습니다.")]
    IdenticalEndpoints(StationId),

    /// A stored chain broke contiguity or the simple-path shape.
    /// Never produced by a valid edit sequence.
    #[error("inconsistent section chain: {reason}")]
    InconsistentChain { reason: String },
}

impl DomainError {
    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentChain {
            reason: reason.into(),
        }
    }

    /// True for rejections caused by the request itself (as opposed to corrupted state).
    pub fn is_rejection(&self) -> bool {
        !matches!(self, DomainError::InconsistentChain { .. })
    }
}
