//! Battlefield grid with tiles, walls and occupants
//!
//! Tiles are stored densely, x fastest then y then z, so a cell index
//! doubles as the node index of the planner's node pool.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::position::Position;
use crate::battle::profile::{Footprint, MovementType};
use crate::battle::tile::{MapPart, Tile, WallSide};
use crate::core::error::{PlannerError, Result};
use crate::core::types::UnitId;

/// A unit standing on the battlefield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: UnitId,
    pub position: Position,
    pub footprint: Footprint,
    /// Unconscious or dead units never block movement
    pub downed: bool,
}

/// The full battlefield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    width: i32,
    length: i32,
    height: i32,
    tiles: Vec<Tile>,
    occupants: AHashMap<UnitId, Occupant>,
}

impl Battlefield {
    /// Create a battlefield of empty air
    pub fn new(width: i32, length: i32, height: i32) -> Result<Self> {
        if width <= 0 || length <= 0 || height <= 0 {
            return Err(PlannerError::InvalidBattlefield(format!(
                "dimensions must be positive, got {}x{}x{}",
                width, length, height
            )));
        }
        let cells = (width * length * height) as usize;
        Self::from_tiles(width, length, height, vec![Tile::empty(); cells])
    }

    /// Create a battlefield whose ground level is covered with `floor`
    pub fn with_ground(width: i32, length: i32, height: i32, floor: MapPart) -> Result<Self> {
        let mut battlefield = Self::new(width, length, height)?;
        for y in 0..length {
            for x in 0..width {
                battlefield.set_floor(Position::new(x, y, 0), Some(floor.clone()));
            }
        }
        Ok(battlefield)
    }

    /// Wrap prepared tiles, ordered x fastest then y then z
    pub fn from_tiles(width: i32, length: i32, height: i32, tiles: Vec<Tile>) -> Result<Self> {
        if width <= 0 || length <= 0 || height <= 0 {
            return Err(PlannerError::InvalidBattlefield(format!(
                "dimensions must be positive, got {}x{}x{}",
                width, length, height
            )));
        }
        let expected = (width * length * height) as usize;
        if tiles.len() != expected {
            return Err(PlannerError::InvalidBattlefield(format!(
                "expected {} tiles for {}x{}x{}, got {}",
                expected,
                width,
                length,
                height,
                tiles.len()
            )));
        }
        if let Some(index) = tiles.iter().position(|t| t.occupant.is_some()) {
            return Err(PlannerError::InvalidBattlefield(format!(
                "tile {} carries an occupant without a placed unit",
                index
            )));
        }

        Ok(Self {
            width,
            length,
            height,
            tiles,
            occupants: AHashMap::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Check if a position is within map bounds
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.width
            && pos.y < self.length
            && pos.z < self.height
    }

    /// Whether every cell of a footprint anchored at `anchor` is on the map
    pub fn footprint_in_bounds(&self, anchor: Position, footprint: Footprint) -> bool {
        footprint.cells(anchor).all(|cell| self.in_bounds(cell))
    }

    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.z * self.length * self.width + pos.y * self.width + pos.x) as usize)
    }

    pub fn position_of(&self, index: usize) -> Position {
        let index = index as i32;
        let layer = self.length * self.width;
        Position::new(index % self.width, (index % layer) / self.width, index / layer)
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index_of(pos).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index_of(pos).map(move |i| &mut self.tiles[i])
    }

    pub fn tile_below(&self, pos: Position) -> Option<&Tile> {
        self.tile(pos.below())
    }

    pub fn set_floor(&mut self, pos: Position, floor: Option<MapPart>) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.floor = floor;
        }
    }

    pub fn set_wall(&mut self, pos: Position, side: WallSide, wall: Option<MapPart>) {
        if let Some(tile) = self.tile_mut(pos) {
            *tile.wall_mut(side) = wall;
        }
    }

    pub fn set_object(&mut self, pos: Position, object: Option<MapPart>) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.object = object;
        }
    }

    pub fn set_fire(&mut self, pos: Position, fire: u8) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.fire = fire;
        }
    }

    /// Advance the animation of a door on a wall
    pub fn set_door_phase(&mut self, pos: Position, side: WallSide, phase: u8) {
        if let Some(door) = self
            .tile_mut(pos)
            .and_then(|t| t.wall_mut(side).as_mut())
            .and_then(|w| w.door.as_mut())
        {
            door.phase = phase;
        }
    }

    // === OCCUPANCY ===

    /// Stand a unit on the battlefield, stamping every covered cell
    pub fn place_unit(&mut self, id: UnitId, position: Position, footprint: Footprint) -> Result<()> {
        if self.occupants.contains_key(&id) {
            self.remove_unit(id);
        }
        for cell in footprint.cells(position) {
            let reason = match self.tile(cell) {
                None => Some("cell outside the battlefield".to_string()),
                Some(tile) => tile
                    .occupant
                    .map(|other| format!("cell {} already holds {}", cell, other)),
            };
            if let Some(reason) = reason {
                tracing::warn!("Rejected placement of {} at {}: {}", id, position, reason);
                return Err(PlannerError::InvalidPlacement {
                    unit: id,
                    position,
                    reason,
                });
            }
        }

        for cell in footprint.cells(position) {
            if let Some(tile) = self.tile_mut(cell) {
                tile.occupant = Some(id);
            }
        }
        self.occupants.insert(
            id,
            Occupant {
                id,
                position,
                footprint,
                downed: false,
            },
        );
        Ok(())
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Occupant> {
        let occupant = self.occupants.remove(&id)?;
        for cell in occupant.footprint.cells(occupant.position) {
            if let Some(tile) = self.tile_mut(cell) {
                if tile.occupant == Some(id) {
                    tile.occupant = None;
                }
            }
        }
        Some(occupant)
    }

    pub fn set_downed(&mut self, id: UnitId, downed: bool) {
        if let Some(occupant) = self.occupants.get_mut(&id) {
            occupant.downed = downed;
        }
    }

    /// The unit standing in a cell, if any
    pub fn occupant_at(&self, pos: Position) -> Option<&Occupant> {
        self.tile(pos)
            .and_then(|t| t.occupant)
            .and_then(|id| self.occupants.get(&id))
    }

    // === GEOMETRY QUERIES ===

    /// Is the wall on `side` of the tile at `pos` impassable?
    ///
    /// Edge-hugging big walls of this tile or of the neighbour sharing the
    /// edge count as walls too. Looking past the map edge is blocked.
    pub fn wall_blocked(&self, pos: Position, side: WallSide, movement: MovementType) -> bool {
        let Some(tile) = self.tile(pos) else {
            return true;
        };
        let neighbour_pos = match side {
            WallSide::West => pos.offset(-1, 0, 0),
            WallSide::North => pos.offset(0, -1, 0),
        };
        let Some(neighbour) = self.tile(neighbour_pos) else {
            return true;
        };

        let own_big_wall = tile.object_big_wall();
        let neighbour_big_wall = neighbour.object_big_wall();
        let edge_covered = match side {
            WallSide::West => own_big_wall.covers_west() || neighbour_big_wall.covers_east(),
            WallSide::North => own_big_wall.covers_north() || neighbour_big_wall.covers_south(),
        };

        edge_covered
            || tile
                .wall(side)
                .is_some_and(|w| w.tu_cost(movement) >= crate::battle::constants::IMPASSABLE_COST)
    }

    /// Can a footprint anchored at `anchor` fall through its current level?
    pub fn can_fall(&self, anchor: Position, footprint: Footprint) -> bool {
        if anchor.z == 0 {
            return false;
        }
        footprint.cells(anchor).all(|cell| match self.tile(cell) {
            Some(tile) => tile.has_no_floor(self.tile_below(cell)),
            None => false,
        })
    }

    /// Lowest base cost any horizontal step into this battlefield can have
    ///
    /// Used as the per-step lower bound of the search heuristic.
    pub fn cheapest_entry(&self, movement: MovementType, unknown_floor_cost: u32, climb_cost: u32) -> u32 {
        self.tiles
            .iter()
            .filter_map(|tile| {
                let floor = tile.floor_cost(movement);
                if floor >= crate::battle::constants::IMPASSABLE_COST {
                    return None;
                }
                if tile.has_no_floor(None) {
                    Some(floor + unknown_floor_cost.min(climb_cost))
                } else {
                    Some(floor)
                }
            })
            .min()
            .unwrap_or(0)
    }
}
