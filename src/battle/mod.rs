//! Tactical movement - path planning on a 3D battlefield
//!
//! The cost of every step comes from a single rules engine, so the planner,
//! the reachable-set expansion and the path preview always agree on what a
//! route costs.
//!
//! Key pieces:
//! - Battlefield of tiles (floor, two walls, content object) and occupants
//! - Step evaluator: walls, doors, stairs, falling, gravlifts, 2x2 units
//! - A* planner and TU/energy bounded flood fill over a reusable node pool
//! - Preview replay with per-tile remaining TU and affordability

pub mod battlefield;
pub mod constants;
pub mod node_pool;
pub mod occupancy;
pub mod options;
pub mod pathfinding;
pub mod position;
pub mod preview;
pub mod profile;
pub mod step_cost;
pub mod tile;

// Re-exports for convenient access
pub use battlefield::{Battlefield, Occupant};
pub use constants::*;
pub use node_pool::{NodePool, PathNode};
pub use occupancy::{KnownOccupants, OccupancyPolicy, SolidOccupants};
pub use options::{PathRequest, PlanningOptions};
pub use pathfinding::{NoRouteReason, PathFailure, PathResult, Pathfinder, PlanContext, Reachable};
pub use position::{Direction, Position};
pub use preview::{Affordability, PathPreview, PreviewTile};
pub use profile::{Footprint, MovementProfile, MovementType};
pub use step_cost::{Spend, Step, StepCost, StepEvaluator, StepOutcome};
pub use tile::{BigWall, Door, DoorKind, MapPart, Tile, TuCosts, WallSide};
