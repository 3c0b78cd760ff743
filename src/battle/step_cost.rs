//! Cost and legality of a single step
//!
//! The evaluator answers one question: what does it cost `unit` to move one
//! cell from `origin` in `direction`? Every search, the reachable-set flood
//! fill and the preview replay go through it, so their numbers always agree.
//!
//! A 2x2 unit is evaluated per quadrant and the quadrant costs averaged.
//! Falling is resolved here too: a walker with nothing under its feet can
//! only go down, whatever direction was asked for.

use crate::battle::battlefield::{Battlefield, Occupant};
use crate::battle::constants::{DROP_LEVEL, IMPASSABLE_COST, STAIRS_LEVEL, WALKABLE_CEILING};
use crate::battle::occupancy::OccupancyPolicy;
use crate::battle::position::{Direction, Position};
use crate::battle::profile::{MovementProfile, MovementType};
use crate::battle::tile::{BigWall, DoorKind, Tile, WallSide};
use crate::core::config::PlannerConfig;
use crate::core::types::UnitId;

/// What one step costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCost {
    /// Search cost in TU, including `door` and `penalty`
    pub time: u32,
    /// Part of `time` spent opening a door
    pub door: u32,
    /// Search-only surcharge the unit never pays
    pub penalty: u32,
    /// TU the step wears out the unit's legs; zero for vertical moves
    pub exertion: u32,
}

/// TU and energy actually charged for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spend {
    pub time: u32,
    pub energy: u32,
}

impl StepCost {
    pub fn free() -> Self {
        Self::default()
    }

    /// Charge the step against a unit
    ///
    /// Dashing cuts the non-door part of the time by a quarter and costs
    /// half as much energy again. Agility is energy efficiency in percent.
    pub fn spend(&self, dash: bool, agility: u32) -> Spend {
        let time = self.time.saturating_sub(self.penalty);
        let (time, exertion) = if dash {
            let door = self.door.min(time);
            ((time - door) * 3 / 4 + door, self.exertion * 3 / 2)
        } else {
            (time, self.exertion)
        };
        Spend {
            time,
            energy: exertion * 50 / agility.max(1),
        }
    }
}

/// A legal step with its resolved destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Direction actually taken; `Down` when the unit was falling
    pub direction: Direction,
    pub origin: Position,
    pub destination: Position,
    pub cost: StepCost,
    /// The unit ended one level lower without choosing to
    pub fell: bool,
}

/// Result of evaluating one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Move(Step),
    /// Legal once a slide door finishes opening
    Wait(Step),
    Blocked,
}

impl StepOutcome {
    /// The step, if it may be part of a planned route
    pub fn planned(self) -> Option<Step> {
        match self {
            StepOutcome::Move(step) | StepOutcome::Wait(step) => Some(step),
            StepOutcome::Blocked => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked)
    }
}

/// Per-quadrant result before averaging
#[derive(Debug, Default)]
struct QuadrantCost {
    time: u32,
    door: u32,
    penalty: u32,
    must_wait: bool,
}

/// Evaluates steps against one battlefield snapshot
pub struct StepEvaluator<'a> {
    battlefield: &'a Battlefield,
    config: &'a PlannerConfig,
    policy: &'a dyn OccupancyPolicy,
    launch_target: Option<UnitId>,
    strafe: bool,
}

impl<'a> StepEvaluator<'a> {
    pub fn new(
        battlefield: &'a Battlefield,
        config: &'a PlannerConfig,
        policy: &'a dyn OccupancyPolicy,
    ) -> Self {
        Self {
            battlefield,
            config,
            policy,
            launch_target: None,
            strafe: false,
        }
    }

    /// Route a guided projectile toward `target`
    ///
    /// Projectiles fly, pass through their target and cannot open doors.
    pub fn with_launch_target(mut self, target: Option<UnitId>) -> Self {
        self.launch_target = target;
        self
    }

    /// Charge the sidestep surcharge for steps off the unit's facing
    pub fn strafing(mut self, strafe: bool) -> Self {
        self.strafe = strafe;
        self
    }

    pub fn battlefield(&self) -> &'a Battlefield {
        self.battlefield
    }

    /// Movement type the unit moves with under this evaluator
    pub fn movement_of(&self, unit: &MovementProfile) -> MovementType {
        if self.launch_target.is_some() {
            MovementType::Fly
        } else {
            unit.movement
        }
    }

    /// Evaluate one step of `unit` from `origin`
    pub fn step(&self, unit: &MovementProfile, origin: Position, direction: Direction) -> StepOutcome {
        let movement = self.movement_of(unit);
        if movement == MovementType::None {
            return StepOutcome::Blocked;
        }
        if !self.battlefield.footprint_in_bounds(origin, unit.footprint) {
            return StepOutcome::Blocked;
        }

        if movement != MovementType::Fly && self.battlefield.can_fall(origin, unit.footprint) {
            return self.fall(unit, origin, movement);
        }

        if direction.is_vertical() {
            self.vertical_step(unit, origin, direction, movement)
        } else {
            self.horizontal_step(unit, origin, direction, movement)
        }
    }

    fn fall(&self, unit: &MovementProfile, origin: Position, movement: MovementType) -> StepOutcome {
        let destination = origin.below();
        let landing_blocked = unit
            .footprint
            .cells(destination)
            .any(|cell| self.cell_blocked(unit, cell, movement));
        if landing_blocked {
            return StepOutcome::Blocked;
        }
        StepOutcome::Move(Step {
            direction: Direction::Down,
            origin,
            destination,
            cost: StepCost::free(),
            fell: true,
        })
    }

    fn vertical_step(
        &self,
        unit: &MovementProfile,
        origin: Position,
        direction: Direction,
        movement: MovementType,
    ) -> StepOutcome {
        let destination = origin.step(direction);
        if !self.battlefield.footprint_in_bounds(destination, unit.footprint) {
            return StepOutcome::Blocked;
        }

        let mut total = 0;
        for quadrant in unit.footprint.quadrants() {
            let from = origin + quadrant;
            let to = destination + quadrant;
            let (Some(start), Some(end)) = (self.battlefield.tile(from), self.battlefield.tile(to))
            else {
                return StepOutcome::Blocked;
            };

            let cost = if start.is_gravlift() && end.is_gravlift() {
                0
            } else if movement == MovementType::Fly {
                let open = match direction {
                    Direction::Up => end.has_no_floor(Some(start)),
                    _ => start.has_no_floor(self.battlefield.tile_below(from)),
                };
                if !open {
                    return StepOutcome::Blocked;
                }
                self.config.vertical_flight_cost
            } else {
                return StepOutcome::Blocked;
            };

            if self.cell_blocked(unit, to, movement) {
                return StepOutcome::Blocked;
            }
            total += cost;
        }

        let parts = unit.footprint.quadrant_count() as u32;
        StepOutcome::Move(Step {
            direction,
            origin,
            destination,
            cost: StepCost {
                time: total / parts,
                ..StepCost::free()
            },
            fell: false,
        })
    }

    fn horizontal_step(
        &self,
        unit: &MovementProfile,
        origin: Position,
        direction: Direction,
        movement: MovementType,
    ) -> StepOutcome {
        let footprint = unit.footprint;
        let mut destination = origin.step(direction);
        if !self.battlefield.footprint_in_bounds(destination, footprint) {
            return StepOutcome::Blocked;
        }

        // Stairs up or a ledge down, decided for the footprint as a whole
        let mut climbing = 0;
        let mut dropping = 0;
        for quadrant in footprint.quadrants() {
            let (Some(start), Some(end)) = (
                self.battlefield.tile(origin + quadrant),
                self.battlefield.tile(destination + quadrant),
            ) else {
                return StepOutcome::Blocked;
            };
            let target = destination + quadrant;
            if start.terrain_level() <= STAIRS_LEVEL
                && self
                    .battlefield
                    .tile(target.above())
                    .is_some_and(|above| !above.has_no_floor(Some(end)))
            {
                climbing += 1;
            }
            if movement != MovementType::Fly
                && target.z > 0
                && end.has_no_floor(self.battlefield.tile_below(target))
                && self
                    .battlefield
                    .tile_below(target)
                    .is_some_and(|below| below.terrain_level() <= DROP_LEVEL)
            {
                dropping += 1;
            }
        }

        if footprint.is_large() && climbing == 1 {
            return StepOutcome::Blocked;
        }
        let climb = climbing >= footprint.size();
        let drop = !climb && dropping == footprint.quadrant_count();
        if climb {
            destination = destination.above();
            if !self.battlefield.footprint_in_bounds(destination, footprint) {
                return StepOutcome::Blocked;
            }
        } else if drop {
            destination = destination.below();
        }

        let mut total = QuadrantCost::default();
        for quadrant in footprint.quadrants() {
            let Some(cost) = self.quadrant_cost(
                unit,
                origin + quadrant,
                destination + quadrant,
                direction,
                movement,
                climb,
                drop,
            ) else {
                return StepOutcome::Blocked;
            };
            if footprint.is_large() && cost.must_wait {
                return StepOutcome::Blocked;
            }
            total.time += cost.time;
            total.door += cost.door;
            total.penalty += cost.penalty;
            total.must_wait |= cost.must_wait;
        }

        if footprint.is_large()
            && (self.straddles_door(destination) || !self.large_footprint_settles(destination, movement, drop))
        {
            return StepOutcome::Blocked;
        }

        let parts = footprint.quadrant_count() as u32;
        let time = total.time / parts;
        let penalty = total.penalty / parts;
        let step = Step {
            direction,
            origin,
            destination,
            cost: StepCost {
                time,
                door: total.door / parts,
                penalty,
                exertion: time.saturating_sub(penalty),
            },
            fell: drop,
        };

        if total.must_wait {
            StepOutcome::Wait(step)
        } else {
            StepOutcome::Move(step)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn quadrant_cost(
        &self,
        unit: &MovementProfile,
        from: Position,
        to: Position,
        direction: Direction,
        movement: MovementType,
        climb: bool,
        drop: bool,
    ) -> Option<QuadrantCost> {
        let start = self.battlefield.tile(from)?;
        let end = self.battlefield.tile(to)?;

        if !climb {
            if self.passage_blocked(from, direction, movement) {
                return None;
            }
            let level_ahead = self.battlefield.tile(from.step(direction))?.terrain_level();
            if i32::from(start.terrain_level()) - i32::from(level_ahead) > self.config.max_step_height {
                return None;
            }
        }

        if self.cell_blocked(unit, to, movement) {
            return None;
        }

        let mut crossed: Vec<(&Tile, WallSide)> = Vec::with_capacity(2);
        if matches!(direction, Direction::North | Direction::NorthEast | Direction::NorthWest) {
            crossed.push((start, WallSide::North));
        }
        if !drop && matches!(direction, Direction::East | Direction::NorthEast | Direction::SouthEast) {
            crossed.push((end, WallSide::West));
        }
        if !drop && matches!(direction, Direction::South | Direction::SouthEast | Direction::SouthWest) {
            crossed.push((end, WallSide::North));
        }
        if matches!(direction, Direction::West | Direction::SouthWest | Direction::NorthWest) {
            crossed.push((start, WallSide::West));
        }

        let mut walls_total = 0;
        let mut walls = 0;
        let mut door = 0;
        let mut must_wait = false;
        for (tile, side) in crossed {
            let Some(wall) = tile.wall(side) else {
                continue;
            };
            let cost = wall.tu_cost(movement);
            if cost >= IMPASSABLE_COST {
                return None;
            }
            if let Some(state) = wall.door {
                if direction.is_diagonal() {
                    return None;
                }
                if self.launch_target.is_some() && !state.is_open() {
                    return None;
                }
                match state.kind {
                    DoorKind::Hinge => {
                        if !state.is_open() {
                            door += cost;
                        }
                        continue;
                    }
                    DoorKind::Slide => must_wait |= !state.is_open(),
                }
            }
            if cost > 0 {
                walls_total += cost;
                walls += 1;
            }
        }

        let mut base = 0;
        if !climb && end.has_no_floor(None) {
            base += self.config.unknown_floor_cost;
        }
        base += end.floor_cost(movement);
        if !climb && !drop {
            base += end.object_cost(movement);
        }
        if climb {
            base += self.config.climb_cost;
        }

        let mut time = if direction.is_diagonal() {
            let averaged_walls = if walls > 0 {
                (walls_total + walls_total / 2 + walls - 1) / walls
            } else {
                0
            };
            base + base / 2 + averaged_walls
        } else {
            base + walls_total
        };
        time += door;
        if self.strafe {
            time += direction
                .angular_distance(unit.facing)
                .min(self.config.strafe_surcharge_cap);
        }
        if time > WALKABLE_CEILING {
            return None;
        }

        let penalty = if end.is_burning() && unit.avoids_fire && !unit.fire_immune {
            self.config.fire_penalty
        } else {
            0
        };

        Some(QuadrantCost {
            time: time + penalty,
            door,
            penalty,
            must_wait,
        })
    }

    /// Corner checks for a 2x2 unit arriving at `anchor`
    fn large_footprint_settles(&self, anchor: Position, movement: MovementType, fell: bool) -> bool {
        let far = anchor.offset(1, 1, 0);
        let east = anchor.offset(1, 0, 0);
        let south = anchor.offset(0, 1, 0);
        if self.passage_blocked(far, Direction::NorthWest, movement)
            || self.passage_blocked(east, Direction::SouthWest, movement)
        {
            return false;
        }
        if fell {
            return true;
        }
        let level = |pos: Position| {
            self.battlefield
                .tile(pos)
                .map(|t| i32::from(t.terrain_level()))
                .unwrap_or(0)
        };
        let tolerance = self.config.large_unit_level_tolerance;
        (level(far) - level(anchor)).abs() <= tolerance
            && (level(east) - level(south)).abs() <= tolerance
    }

    /// Would a 2x2 unit anchored at `anchor` have a door running through it?
    ///
    /// Only the far quadrant is checked: both of its walls lie inside the
    /// footprint.
    pub fn straddles_door(&self, anchor: Position) -> bool {
        self.battlefield
            .tile(anchor.offset(1, 1, 0))
            .is_some_and(Tile::has_door)
    }

    /// Do walls or big walls stop a step leaving `from` in `direction`?
    ///
    /// Diagonal steps check all four wall segments meeting at the corner
    /// being cut, plus diagonal big walls in the two side cells that do not
    /// run along the travel direction.
    pub fn passage_blocked(&self, from: Position, direction: Direction, movement: MovementType) -> bool {
        let wall = |pos: Position, side: WallSide| self.battlefield.wall_blocked(pos, side, movement);
        let corner = |pos: Position, parallel: BigWall| {
            self.battlefield
                .tile(pos)
                .is_some_and(|t| t.object_big_wall().blocks_corner(parallel))
        };
        let north = from.offset(0, -1, 0);
        let east = from.offset(1, 0, 0);
        let south = from.offset(0, 1, 0);
        let west = from.offset(-1, 0, 0);

        match direction {
            Direction::North => wall(from, WallSide::North),
            Direction::East => wall(east, WallSide::West),
            Direction::South => wall(south, WallSide::North),
            Direction::West => wall(from, WallSide::West),
            Direction::NorthEast => {
                wall(from, WallSide::North)
                    || wall(east, WallSide::North)
                    || wall(east, WallSide::West)
                    || wall(north.offset(1, 0, 0), WallSide::West)
                    || corner(east, BigWall::NeSw)
                    || corner(north, BigWall::NeSw)
            }
            Direction::SouthEast => {
                wall(east, WallSide::West)
                    || wall(south, WallSide::North)
                    || wall(south.offset(1, 0, 0), WallSide::North)
                    || wall(south.offset(1, 0, 0), WallSide::West)
                    || corner(east, BigWall::NwSe)
                    || corner(south, BigWall::NwSe)
            }
            Direction::SouthWest => {
                wall(from, WallSide::West)
                    || wall(south, WallSide::West)
                    || wall(south, WallSide::North)
                    || wall(south.offset(-1, 0, 0), WallSide::North)
                    || corner(south, BigWall::NeSw)
                    || corner(west, BigWall::NeSw)
            }
            Direction::NorthWest => {
                wall(from, WallSide::West)
                    || wall(from, WallSide::North)
                    || wall(west, WallSide::North)
                    || wall(north, WallSide::West)
                    || corner(north, BigWall::NwSe)
                    || corner(west, BigWall::NwSe)
            }
            Direction::Up | Direction::Down => false,
        }
    }

    /// Can `unit` not stand in `cell`?
    ///
    /// Impassable floors and objects block, as do occupants the unit may
    /// not pass. A walker entering open air also checks what it would land
    /// on: 2x2 units never fall onto units and nobody falls onto a 2x2 unit.
    pub fn cell_blocked(&self, unit: &MovementProfile, cell: Position, movement: MovementType) -> bool {
        let Some(tile) = self.battlefield.tile(cell) else {
            return true;
        };

        if let Some(occupant) = self.battlefield.occupant_at(cell) {
            if self.occupant_blocks(unit, occupant) {
                return true;
            }
        } else if movement != MovementType::Fly && tile.has_no_floor(None) {
            for z in (0..=cell.z).rev() {
                let below = Position::new(cell.x, cell.y, z);
                if let Some(occupant) = self.battlefield.occupant_at(below) {
                    let standing = occupant.id != unit.unit
                        && !occupant.downed
                        && Some(occupant.id) != self.launch_target;
                    if standing && (unit.footprint.is_large() || occupant.footprint.is_large()) {
                        return true;
                    }
                }
                match self.battlefield.tile(below) {
                    Some(t) if t.has_no_floor(None) => continue,
                    _ => break,
                }
            }
        }

        tile.floor_cost(movement) >= IMPASSABLE_COST || tile.object_cost(movement) >= IMPASSABLE_COST
    }

    fn occupant_blocks(&self, unit: &MovementProfile, occupant: &Occupant) -> bool {
        if occupant.id == unit.unit || occupant.downed || Some(occupant.id) == self.launch_target {
            return false;
        }
        !self.policy.is_passable_for(unit, occupant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::occupancy::{KnownOccupants, SolidOccupants};
    use crate::battle::profile::Footprint;
    use crate::battle::tile::MapPart;

    fn flat(width: i32, length: i32, height: i32) -> Battlefield {
        Battlefield::with_ground(width, length, height, MapPart::floor(4)).unwrap()
    }

    fn walker(position: Position) -> MovementProfile {
        MovementProfile::new(UnitId::new(), position)
    }

    fn cost_of(outcome: StepOutcome) -> StepCost {
        outcome.planned().expect("step should be legal").cost
    }

    #[test]
    fn test_straight_and_diagonal_floor() {
        let battlefield = flat(5, 5, 1);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::East)).time, 4);
        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::SouthWest)).time, 6);
    }

    #[test]
    fn test_diagonal_averages_crossed_walls() {
        let mut battlefield = flat(5, 5, 1);
        // Stepping NE from (1,2) crosses our north wall and the destination's west wall
        battlefield.set_wall(Position::new(1, 2, 0), WallSide::North, Some(MapPart::wall(4)));
        battlefield.set_wall(Position::new(2, 1, 0), WallSide::West, Some(MapPart::wall(4)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 2, 0));

        let cost = cost_of(evaluator.step(&unit, unit.position, Direction::NorthEast));
        assert_eq!(cost.time, 12);
    }

    #[test]
    fn test_solid_wall_blocks_straight_and_diagonal() {
        let mut battlefield = flat(5, 5, 1);
        battlefield.set_wall(Position::new(3, 2, 0), WallSide::West, Some(MapPart::solid_wall()));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        assert!(evaluator.step(&unit, unit.position, Direction::East).is_blocked());
        assert!(evaluator.step(&unit, unit.position, Direction::NorthEast).is_blocked());
        assert!(evaluator.step(&unit, unit.position, Direction::SouthEast).is_blocked());
        assert!(!evaluator.step(&unit, unit.position, Direction::North).is_blocked());
    }

    #[test]
    fn test_diagonal_big_wall_blocks_cutting_corner() {
        let mut battlefield = flat(5, 5, 1);
        battlefield.set_object(Position::new(3, 2, 0), Some(MapPart::big_wall(BigWall::NwSe)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        assert!(evaluator.step(&unit, unit.position, Direction::NorthEast).is_blocked());
    }

    #[test]
    fn test_hinge_door_charged_as_door_time() {
        let mut battlefield = flat(5, 5, 1);
        battlefield.set_wall(
            Position::new(3, 2, 0),
            WallSide::West,
            Some(MapPart::door(DoorKind::Hinge, 4)),
        );
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        let cost = cost_of(evaluator.step(&unit, unit.position, Direction::East));
        assert_eq!(cost.time, 8);
        assert_eq!(cost.door, 4);

        // Never through a door diagonally
        let below = walker(Position::new(2, 1, 0));
        assert!(evaluator.step(&below, below.position, Direction::SouthEast).is_blocked());
    }

    #[test]
    fn test_open_hinge_door_is_free() {
        let mut battlefield = flat(5, 5, 1);
        let door_at = Position::new(3, 2, 0);
        battlefield.set_wall(door_at, WallSide::West, Some(MapPart::door(DoorKind::Hinge, 4)));
        battlefield.set_door_phase(door_at, WallSide::West, 1);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        let cost = cost_of(evaluator.step(&unit, unit.position, Direction::East));
        assert_eq!(cost.time, 4);
        assert_eq!(cost.door, 0);
    }

    #[test]
    fn test_closed_slide_door_waits_for_small_blocks_large() {
        let mut battlefield = flat(6, 6, 1);
        let door_at = Position::new(3, 2, 0);
        battlefield.set_wall(door_at, WallSide::West, Some(MapPart::door(DoorKind::Slide, 2)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);

        let small = walker(Position::new(2, 2, 0));
        match evaluator.step(&small, small.position, Direction::East) {
            StepOutcome::Wait(step) => assert_eq!(step.cost.time, 6),
            other => panic!("expected wait, got {:?}", other),
        }

        let large = walker(Position::new(1, 2, 0)).with_footprint(Footprint::Large);
        assert!(evaluator.step(&large, large.position, Direction::East).is_blocked());
    }

    #[test]
    fn test_open_slide_door_moves() {
        let mut battlefield = flat(5, 5, 1);
        let door_at = Position::new(3, 2, 0);
        battlefield.set_wall(door_at, WallSide::West, Some(MapPart::door(DoorKind::Slide, 2)));
        battlefield.set_door_phase(door_at, WallSide::West, 7);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(2, 2, 0));

        assert!(matches!(
            evaluator.step(&unit, unit.position, Direction::East),
            StepOutcome::Move(_)
        ));
    }

    #[test]
    fn test_launch_target_cannot_open_doors() {
        let mut battlefield = flat(5, 5, 1);
        battlefield.set_wall(
            Position::new(3, 2, 0),
            WallSide::West,
            Some(MapPart::door(DoorKind::Hinge, 4)),
        );
        let config = PlannerConfig::default();
        let evaluator =
            StepEvaluator::new(&battlefield, &config, &SolidOccupants).with_launch_target(Some(UnitId::new()));
        let unit = walker(Position::new(2, 2, 0));

        assert_eq!(evaluator.movement_of(&unit), MovementType::Fly);
        assert!(evaluator.step(&unit, unit.position, Direction::East).is_blocked());
    }

    #[test]
    fn test_unsupported_walker_falls_whatever_the_direction() {
        let battlefield = flat(4, 4, 3);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 1, 2));

        for direction in Direction::ALL {
            let step = evaluator
                .step(&unit, unit.position, direction)
                .planned()
                .expect("falling is always possible onto empty air");
            assert_eq!(step.direction, Direction::Down);
            assert_eq!(step.destination, Position::new(1, 1, 1));
            assert_eq!(step.cost.time, 0);
            assert!(step.fell);
        }

        let flier = unit.clone().with_movement(MovementType::Fly);
        let step = evaluator.step(&flier, flier.position, Direction::East).planned().unwrap();
        assert_eq!(step.destination, Position::new(2, 1, 2));
        assert_eq!(step.cost.time, 4);
    }

    #[test]
    fn test_gravlift_and_flight() {
        let mut battlefield = flat(4, 4, 2);
        battlefield.set_floor(Position::new(1, 1, 0), Some(MapPart::gravlift(4)));
        battlefield.set_floor(Position::new(1, 1, 1), Some(MapPart::gravlift(4)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);

        let rider = walker(Position::new(1, 1, 0));
        assert_eq!(cost_of(evaluator.step(&rider, rider.position, Direction::Up)).time, 0);

        let climber = walker(Position::new(2, 2, 0));
        assert!(evaluator.step(&climber, climber.position, Direction::Up).is_blocked());

        let flier = climber.clone().with_movement(MovementType::Fly);
        let step = evaluator.step(&flier, flier.position, Direction::Up).planned().unwrap();
        assert_eq!(step.cost.time, config.vertical_flight_cost);
        assert_eq!(step.cost.exertion, 0);
    }

    #[test]
    fn test_flying_up_needs_open_ceiling() {
        let mut battlefield = flat(4, 4, 2);
        battlefield.set_floor(Position::new(2, 2, 1), Some(MapPart::floor(4)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let flier = walker(Position::new(2, 2, 0)).with_movement(MovementType::Fly);

        assert!(evaluator.step(&flier, flier.position, Direction::Up).is_blocked());
        assert!(evaluator.step(&flier, flier.position, Direction::Down).is_blocked());
    }

    #[test]
    fn test_stairs_climb_one_level() {
        let mut battlefield = flat(4, 4, 2);
        battlefield.set_object(Position::new(1, 1, 0), Some(MapPart::object(4, STAIRS_LEVEL)));
        battlefield.set_floor(Position::new(2, 1, 1), Some(MapPart::floor(4)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 1, 0));

        let step = evaluator.step(&unit, unit.position, Direction::East).planned().unwrap();
        assert_eq!(step.destination, Position::new(2, 1, 1));
        assert_eq!(step.cost.time, 4 + config.climb_cost);
    }

    #[test]
    fn test_step_down_onto_tall_object() {
        let mut battlefield = flat(4, 4, 2);
        battlefield.set_floor(Position::new(1, 1, 1), Some(MapPart::floor(4)));
        battlefield.set_object(Position::new(2, 1, 0), Some(MapPart::object(6, STAIRS_LEVEL)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 1, 1));

        let step = evaluator.step(&unit, unit.position, Direction::East).planned().unwrap();
        assert!(step.fell);
        assert_eq!(step.destination, Position::new(2, 1, 0));
        assert_eq!(step.cost.time, 4);
    }

    #[test]
    fn test_step_height_limit() {
        let mut battlefield = flat(4, 4, 1);
        battlefield.set_object(Position::new(2, 1, 0), Some(MapPart::object(4, -12)));
        battlefield.set_object(Position::new(1, 2, 0), Some(MapPart::object(4, -8)));
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 1, 0));

        assert!(evaluator.step(&unit, unit.position, Direction::East).is_blocked());
        assert!(!evaluator.step(&unit, unit.position, Direction::South).is_blocked());
    }

    #[test]
    fn test_occupants_and_policy() {
        let mut battlefield = flat(5, 5, 1);
        let other = UnitId::new();
        battlefield.place_unit(other, Position::new(3, 2, 0), Footprint::Small).unwrap();
        let config = PlannerConfig::default();
        let unit = walker(Position::new(2, 2, 0));

        let solid = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        assert!(solid.step(&unit, unit.position, Direction::East).is_blocked());

        let unaware = KnownOccupants::new();
        let evaluator = StepEvaluator::new(&battlefield, &config, &unaware);
        assert!(!evaluator.step(&unit, unit.position, Direction::East).is_blocked());

        battlefield.set_downed(other, true);
        let solid = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        assert!(!solid.step(&unit, unit.position, Direction::East).is_blocked());
    }

    #[test]
    fn test_fire_penalty_is_search_only() {
        let mut battlefield = flat(5, 5, 1);
        battlefield.set_fire(Position::new(3, 2, 0), 3);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let mut unit = walker(Position::new(2, 2, 0));
        unit.avoids_fire = true;

        let cost = cost_of(evaluator.step(&unit, unit.position, Direction::East));
        assert_eq!(cost.time, 4 + config.fire_penalty);
        assert_eq!(cost.spend(false, 100).time, 4);

        unit.fire_immune = true;
        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::East)).time, 4);
    }

    #[test]
    fn test_strafe_surcharge_capped() {
        let battlefield = flat(5, 5, 1);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants).strafing(true);
        let unit = walker(Position::new(2, 2, 0)).with_facing(Direction::North);

        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::North)).time, 4);
        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::NorthEast)).time, 7);
        assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::South)).time, 6);
    }

    #[test]
    fn test_large_footprint_checks_every_quadrant() {
        let mut battlefield = flat(6, 6, 1);
        let config = PlannerConfig::default();
        let unit = walker(Position::new(1, 1, 0)).with_footprint(Footprint::Large);

        {
            let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
            assert_eq!(cost_of(evaluator.step(&unit, unit.position, Direction::East)).time, 4);
        }

        battlefield.set_object(Position::new(3, 2, 0), Some(MapPart::object(IMPASSABLE_COST, 0)));
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        assert!(evaluator.step(&unit, unit.position, Direction::East).is_blocked());
    }

    #[test]
    fn test_large_footprint_cannot_straddle_door() {
        let mut battlefield = flat(6, 6, 1);
        battlefield.set_wall(
            Position::new(3, 2, 0),
            WallSide::North,
            Some(MapPart::door(DoorKind::Hinge, 4)),
        );
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(1, 1, 0)).with_footprint(Footprint::Large);

        assert!(evaluator.step(&unit, unit.position, Direction::East).is_blocked());
    }

    #[test]
    fn test_spend_dash_spares_door_time() {
        let cost = StepCost {
            time: 12,
            door: 4,
            penalty: 0,
            exertion: 12,
        };
        assert_eq!(cost.spend(false, 100), Spend { time: 12, energy: 6 });
        assert_eq!(cost.spend(true, 100), Spend { time: 10, energy: 9 });
        assert_eq!(cost.spend(false, 50).energy, 12);
    }

    #[test]
    fn test_outside_map_blocked() {
        let battlefield = flat(3, 3, 1);
        let config = PlannerConfig::default();
        let evaluator = StepEvaluator::new(&battlefield, &config, &SolidOccupants);
        let unit = walker(Position::new(0, 0, 0));

        assert!(evaluator.step(&unit, unit.position, Direction::West).is_blocked());
        assert!(evaluator.step(&unit, unit.position, Direction::NorthEast).is_blocked());
        assert!(evaluator.step(&unit, unit.position, Direction::Up).is_blocked());
    }
}
