//! Per-unit movement capabilities
//!
//! A `MovementProfile` is everything the planner needs to know about a
//! unit: where it stands, how it moves, how big it is, and what it can
//! afford this turn.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{LARGE_FOOTPRINT_QUADRANTS, SMALL_FOOTPRINT_QUADRANTS};
use crate::battle::position::{Direction, Position};
use crate::core::types::{TimeUnits, UnitId};

/// How a unit moves between tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementType {
    #[default]
    Walk,
    Fly,
    None, // Turrets and other immobile units
}

/// Number of cells a unit covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Footprint {
    #[default]
    Small, // 1x1
    Large, // 2x2, anchored at its north-west quadrant
}

impl Footprint {
    /// Cells along one side
    pub fn size(&self) -> i32 {
        match self {
            Footprint::Small => 1,
            Footprint::Large => 2,
        }
    }

    pub fn quadrant_count(&self) -> usize {
        match self {
            Footprint::Small => SMALL_FOOTPRINT_QUADRANTS,
            Footprint::Large => LARGE_FOOTPRINT_QUADRANTS,
        }
    }

    /// Offsets of every covered cell from the anchor, row by row
    pub fn quadrants(&self) -> impl Iterator<Item = Position> {
        let size = self.size();
        (0..size).flat_map(move |x| (0..size).map(move |y| Position::new(x, y, 0)))
    }

    /// Cells covered when anchored at `anchor`
    pub fn cells(&self, anchor: Position) -> impl Iterator<Item = Position> {
        self.quadrants().map(move |q| anchor + q)
    }

    pub fn is_large(&self) -> bool {
        matches!(self, Footprint::Large)
    }
}

/// Movement-relevant state of one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementProfile {
    pub unit: UnitId,
    pub position: Position,
    pub movement: MovementType,
    pub footprint: Footprint,
    pub time_units: TimeUnits,
    pub energy: u32,
    /// Stamina efficiency in percent: 100 spends half a point of energy per TU
    pub agility: u32,
    pub facing: Direction,
    pub kneeling: bool,
    /// Tracked vehicles may only strafe along their facing axis
    pub vehicle: bool,
    /// Steer around burning tiles (AI-controlled units)
    pub avoids_fire: bool,
    pub fire_immune: bool,
}

impl MovementProfile {
    /// A standing 1x1 infantry walker with a full turn budget
    pub fn new(unit: UnitId, position: Position) -> Self {
        Self {
            unit,
            position,
            movement: MovementType::Walk,
            footprint: Footprint::Small,
            time_units: 60,
            energy: 90,
            agility: 100,
            facing: Direction::North,
            kneeling: false,
            vehicle: false,
            avoids_fire: false,
            fire_immune: false,
        }
    }

    pub fn with_movement(mut self, movement: MovementType) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn with_budget(mut self, time_units: TimeUnits, energy: u32) -> Self {
        self.time_units = time_units;
        self.energy = energy;
        self
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    pub fn kneeling(mut self) -> Self {
        self.kneeling = true;
        self
    }

    pub fn as_vehicle(mut self) -> Self {
        self.vehicle = true;
        self
    }

    pub fn is_mobile(&self) -> bool {
        self.movement != MovementType::None
    }
}
