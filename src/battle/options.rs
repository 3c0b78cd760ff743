//! Per-call planning switches and requests

use serde::{Deserialize, Serialize};

use crate::battle::position::Position;
use crate::core::types::{TimeUnits, UnitId};

/// Caller-owned switches for one planning call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanningOptions {
    /// Penalise diagonal steps that stay on one level during search
    pub prefer_same_level: bool,
    /// Allow sidestepping without turning to face the travel direction
    pub allow_strafe: bool,
    /// Trade energy for time units on multi-step routes
    pub allow_dash: bool,
}

impl PlanningOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferring_same_level(mut self) -> Self {
        self.prefer_same_level = true;
        self
    }

    pub fn with_strafe(mut self) -> Self {
        self.allow_strafe = true;
        self
    }

    pub fn with_dash(mut self) -> Self {
        self.allow_dash = true;
        self
    }
}

/// Where to go and what the route may cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRequest {
    pub target: Position,
    pub tu_cap: TimeUnits,
    /// Guided projectile routing toward this unit
    pub launch_target: Option<UnitId>,
    pub reject_strafe: bool,
}

impl PathRequest {
    pub fn new(target: Position, tu_cap: TimeUnits) -> Self {
        Self {
            target,
            tu_cap,
            launch_target: None,
            reject_strafe: false,
        }
    }

    /// Route with no TU bound
    pub fn unbounded(target: Position) -> Self {
        Self::new(target, TimeUnits::MAX)
    }

    pub fn with_launch_target(mut self, target: UnitId) -> Self {
        self.launch_target = Some(target);
        self
    }

    pub fn rejecting_strafe(mut self) -> Self {
        self.reject_strafe = true;
        self
    }
}
