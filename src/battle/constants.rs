//! Movement rule constants - fixed values of the tile model
//!
//! Tunable costs live in `PlannerConfig`; these describe map data and
//! never change between sessions.

// Tile part costs
pub const IMPASSABLE_COST: u32 = 255; // A part costing this much (or more) blocks
pub const WALKABLE_CEILING: u32 = 255; // A quadrant summing above this fails the step

// Terrain levels (0 = floor height, negative = raised)
pub const FULL_HEIGHT_LEVEL: i8 = -24; // Object fills the tile; the tile above stands on it
pub const STAIRS_LEVEL: i8 = -16; // Standing this high lets a unit climb one level
pub const DROP_LEVEL: i8 = -12; // Tall enough below to step down onto

// Doors
pub const SLIDE_DOOR_OPEN_PHASE: u8 = 7; // Last frame of the slide door animation

// Footprints
pub const SMALL_FOOTPRINT_QUADRANTS: usize = 1;
pub const LARGE_FOOTPRINT_QUADRANTS: usize = 4;
