//! Who may walk through whom
//!
//! Faction, visibility and mind-control rules belong to the caller. The
//! planner only asks whether a given occupant blocks a given unit.

use ahash::AHashSet;

use crate::battle::battlefield::Occupant;
use crate::battle::profile::MovementProfile;
use crate::core::types::UnitId;

/// Decides whether an occupied cell can be entered
///
/// The moving unit itself and downed occupants are always passable and
/// never reach the policy.
pub trait OccupancyPolicy {
    fn is_passable_for(&self, unit: &MovementProfile, occupant: &Occupant) -> bool;
}

/// Every standing unit blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidOccupants;

impl OccupancyPolicy for SolidOccupants {
    fn is_passable_for(&self, _unit: &MovementProfile, _occupant: &Occupant) -> bool {
        false
    }
}

/// Only units the planning side knows about block
///
/// Unseen enemies do not stop a route from being planned; the walk is
/// interrupted when they are discovered.
#[derive(Debug, Clone, Default)]
pub struct KnownOccupants {
    known: AHashSet<UnitId>,
}

impl KnownOccupants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reveal(&mut self, unit: UnitId) {
        self.known.insert(unit);
    }

    pub fn forget(&mut self, unit: UnitId) {
        self.known.remove(&unit);
    }

    pub fn knows(&self, unit: UnitId) -> bool {
        self.known.contains(&unit)
    }
}

impl OccupancyPolicy for KnownOccupants {
    fn is_passable_for(&self, _unit: &MovementProfile, occupant: &Occupant) -> bool {
        !self.knows(occupant.id)
    }
}
