use thiserror::Error;

use crate::battle::position::Position;
use crate::core::types::UnitId;

/// Fatal planner errors.
///
/// Unreachable targets are not errors: planning reports them through
/// `PathResult::failure`. These variants cover malformed input only.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Unit {unit} stands outside the battlefield at {position}")]
    UnitOutOfBounds { unit: UnitId, position: Position },

    #[error("Node pool holds {pool} nodes but the battlefield has {cells} cells")]
    PoolMismatch { pool: usize, cells: usize },

    #[error("Invalid battlefield: {0}")]
    InvalidBattlefield(String),

    #[error("Cannot place unit {unit} at {position}: {reason}")]
    InvalidPlacement {
        unit: UnitId,
        position: Position,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
