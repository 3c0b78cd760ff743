//! Planner configuration with documented constants
//!
//! The tunable integers of the movement cost model live here. Defaults
//! reproduce the balance values; the diagonal averaging formula and the
//! dash arithmetic are not configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{PlannerError, Result};

/// Configuration for the movement planner
///
/// Every value is an integer. Costs are in time units (TU).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // === SURCHARGES ===
    /// Added to a step entering a burning tile for units that avoid fire
    ///
    /// Search-only: spending the step subtracts it again, so the unit
    /// never pays it. Large enough to route around a fire, small enough
    /// not to exclude the tile entirely.
    pub fire_penalty: u32,

    /// One-time cost for a kneeling unit to stand before walking
    pub stand_up_cost: u32,

    /// Cost of one flying step straight up or down (gravlifts are free)
    pub vertical_flight_cost: u32,

    /// Base cost of entering a tile with no floor
    ///
    /// The real cost is unknown until the unit lands, so planning assumes
    /// a plain floor.
    pub unknown_floor_cost: u32,

    /// Extra cost for climbing one level via stairs
    pub climb_cost: u32,

    /// Search penalty for same-level diagonal steps when the preference is on
    ///
    /// Never part of a reported TU cost.
    pub same_level_penalty: u32,

    /// Upper bound of the per-step strafing surcharge
    pub strafe_surcharge_cap: u32,

    // === GEOMETRY ===
    /// Highest terrain-level drop a unit can step up from in one move
    ///
    /// Stairs go -8 -16 or -4 -12 -20, so 8 allows one stair at a time.
    pub max_step_height: i32,

    /// Terrain-level tolerance between the diagonal corners of a 2x2 unit
    pub large_unit_level_tolerance: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fire_penalty: 32,
            stand_up_cost: 8,
            vertical_flight_cost: 8,
            unknown_floor_cost: 4,
            climb_cost: 1,
            same_level_penalty: 4,
            strafe_surcharge_cap: 2,
            max_step_height: 8,
            large_unit_level_tolerance: 10,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text, filling missing keys with defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_step_height < 0 || self.max_step_height > 24 {
            return Err(PlannerError::InvalidConfig(format!(
                "max_step_height ({}) must lie within one tile (0..=24)",
                self.max_step_height
            )));
        }

        if self.large_unit_level_tolerance < 0 {
            return Err(PlannerError::InvalidConfig(format!(
                "large_unit_level_tolerance ({}) must not be negative",
                self.large_unit_level_tolerance
            )));
        }

        // A vertical flight step must stay below the impassable sentinel
        if self.vertical_flight_cost >= crate::battle::constants::IMPASSABLE_COST {
            return Err(PlannerError::InvalidConfig(format!(
                "vertical_flight_cost ({}) would make flying impassable",
                self.vertical_flight_cost
            )));
        }

        Ok(())
    }
}

/// Load a planner config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<PlannerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config = PlannerConfig::from_toml_str(&contents)?;
    tracing::debug!("Loaded planner config from {:?}", path);
    Ok(config)
}
