//! Tile parts and their movement effects
//!
//! A tile is a floor, two walls (west and north edges), and one content
//! object. Each part carries its own per-movement-type TU cost.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{FULL_HEIGHT_LEVEL, IMPASSABLE_COST, SLIDE_DOOR_OPEN_PHASE};
use crate::battle::profile::MovementType;
use crate::core::types::UnitId;

/// How a unit moves is priced per part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TuCosts {
    pub walk: u32,
    pub fly: u32,
}

impl TuCosts {
    pub fn uniform(cost: u32) -> Self {
        Self {
            walk: cost,
            fly: cost,
        }
    }

    pub fn impassable() -> Self {
        Self::uniform(IMPASSABLE_COST)
    }

    pub fn for_movement(&self, movement: MovementType) -> u32 {
        match movement {
            MovementType::Walk => self.walk,
            MovementType::Fly => self.fly,
            MovementType::None => IMPASSABLE_COST,
        }
    }
}

/// Door behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Hinge, // Swings open instantly, costs TU
    Slide, // Animates open over several frames
}

/// A door and its animation phase
///
/// Phase 0 is closed. Hinge doors are open at any other phase; slide
/// doors only once the animation reaches its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Door {
    pub kind: DoorKind,
    pub phase: u8,
}

impl Door {
    pub fn closed(kind: DoorKind) -> Self {
        Self { kind, phase: 0 }
    }

    pub fn is_open(&self) -> bool {
        match self.kind {
            DoorKind::Hinge => self.phase > 0,
            DoorKind::Slide => self.phase >= SLIDE_DOOR_OPEN_PHASE,
        }
    }
}

/// Diagonal or edge-blocking content objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BigWall {
    #[default]
    None,
    Block,        // Fills the whole tile
    NeSw,         // Diagonal from north-east to south-west corner
    NwSe,         // Diagonal from north-west to south-east corner
    West,         // Along the west edge
    North,        // Along the north edge
    East,         // Along the east edge
    South,        // Along the south edge
    EastAndSouth, // Both the east and south edges
    WestAndNorth, // Both the west and north edges
}

impl BigWall {
    /// Blocks diagonal travel through the tile's corner
    ///
    /// A diagonal wall parallel to the travel direction does not block.
    pub fn blocks_corner(&self, parallel: BigWall) -> bool {
        matches!(self, BigWall::Block | BigWall::NeSw | BigWall::NwSe) && *self != parallel
    }

    pub fn covers_west(&self) -> bool {
        matches!(self, BigWall::West | BigWall::WestAndNorth)
    }

    pub fn covers_north(&self) -> bool {
        matches!(self, BigWall::North | BigWall::WestAndNorth)
    }

    pub fn covers_east(&self) -> bool {
        matches!(self, BigWall::East | BigWall::EastAndSouth)
    }

    pub fn covers_south(&self) -> bool {
        matches!(self, BigWall::South | BigWall::EastAndSouth)
    }
}

/// One of the four parts making up a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPart {
    pub costs: TuCosts,
    pub terrain_level: i8,
    pub no_floor: bool,
    pub gravlift: bool,
    pub door: Option<Door>,
    pub big_wall: BigWall,
}

impl MapPart {
    fn with_costs(costs: TuCosts) -> Self {
        Self {
            costs,
            terrain_level: 0,
            no_floor: false,
            gravlift: false,
            door: None,
            big_wall: BigWall::None,
        }
    }

    /// Plain floor at ground height
    pub fn floor(cost: u32) -> Self {
        Self::with_costs(TuCosts::uniform(cost))
    }

    /// Gravlift pad: free vertical travel between stacked pads
    pub fn gravlift(cost: u32) -> Self {
        Self {
            gravlift: true,
            ..Self::floor(cost)
        }
    }

    /// Wall that can be crossed at the given cost (rubble, low fence)
    pub fn wall(cost: u32) -> Self {
        Self::with_costs(TuCosts::uniform(cost))
    }

    pub fn solid_wall() -> Self {
        Self::with_costs(TuCosts::impassable())
    }

    /// Closed door of the given kind
    pub fn door(kind: DoorKind, cost: u32) -> Self {
        Self {
            door: Some(Door::closed(kind)),
            ..Self::wall(cost)
        }
    }

    /// Content object standing on the floor
    pub fn object(cost: u32, terrain_level: i8) -> Self {
        Self {
            terrain_level,
            ..Self::with_costs(TuCosts::uniform(cost))
        }
    }

    pub fn big_wall(kind: BigWall) -> Self {
        Self {
            big_wall: kind,
            ..Self::with_costs(TuCosts::impassable())
        }
    }

    pub fn tu_cost(&self, movement: MovementType) -> u32 {
        self.costs.for_movement(movement)
    }

    pub fn is_door(&self) -> bool {
        self.door.is_some()
    }
}

/// Wall edge of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    West,
    North,
}

/// A single battlefield cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub floor: Option<MapPart>,
    pub west_wall: Option<MapPart>,
    pub north_wall: Option<MapPart>,
    pub object: Option<MapPart>,
    pub fire: u8,
    pub occupant: Option<UnitId>,
}

impl Tile {
    /// Empty air
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_floor(floor: MapPart) -> Self {
        Self {
            floor: Some(floor),
            ..Self::default()
        }
    }

    pub fn wall(&self, side: WallSide) -> Option<&MapPart> {
        match side {
            WallSide::West => self.west_wall.as_ref(),
            WallSide::North => self.north_wall.as_ref(),
        }
    }

    pub fn wall_mut(&mut self, side: WallSide) -> &mut Option<MapPart> {
        match side {
            WallSide::West => &mut self.west_wall,
            WallSide::North => &mut self.north_wall,
        }
    }

    pub fn floor_cost(&self, movement: MovementType) -> u32 {
        self.floor.as_ref().map(|f| f.tu_cost(movement)).unwrap_or(0)
    }

    pub fn object_cost(&self, movement: MovementType) -> u32 {
        self.object.as_ref().map(|o| o.tu_cost(movement)).unwrap_or(0)
    }

    /// Height of the highest surface, 0 at floor level down to -24
    pub fn terrain_level(&self) -> i8 {
        [self.floor.as_ref(), self.object.as_ref()]
            .into_iter()
            .flatten()
            .map(|part| part.terrain_level)
            .fold(0, i8::min)
    }

    /// No floor to stand on, unless the tile below is filled to the top
    pub fn has_no_floor(&self, below: Option<&Tile>) -> bool {
        if below.is_some_and(|b| b.terrain_level() == FULL_HEIGHT_LEVEL) {
            return false;
        }
        self.floor.as_ref().map(|f| f.no_floor).unwrap_or(true)
    }

    pub fn is_gravlift(&self) -> bool {
        self.floor.as_ref().is_some_and(|f| f.gravlift)
    }

    pub fn object_big_wall(&self) -> BigWall {
        self.object.as_ref().map(|o| o.big_wall).unwrap_or_default()
    }

    pub fn is_burning(&self) -> bool {
        self.fire > 0
    }

    /// Whether either wall on this tile is a door
    pub fn has_door(&self) -> bool {
        self.west_wall.as_ref().is_some_and(MapPart::is_door)
            || self.north_wall.as_ref().is_some_and(MapPart::is_door)
    }
}
