//! A* pathfinding and reachable-set expansion on the battlefield
//!
//! Every edge cost comes from the step evaluator, so a planned route costs
//! exactly what the preview and the walk will charge for it.

use serde::{Deserialize, Serialize};

use crate::battle::battlefield::Battlefield;
use crate::battle::constants::FULL_HEIGHT_LEVEL;
use crate::battle::node_pool::NodePool;
use crate::battle::occupancy::OccupancyPolicy;
use crate::battle::options::{PathRequest, PlanningOptions};
use crate::battle::position::{Direction, Position};
use crate::battle::preview::PathPreview;
use crate::battle::profile::{MovementProfile, MovementType};
use crate::battle::step_cost::StepEvaluator;
use crate::core::config::PlannerConfig;
use crate::core::error::{PlannerError, Result};
use crate::core::types::{TimeUnits, UnitId};

/// Read-only inputs shared by one planning call
#[derive(Clone, Copy)]
pub struct PlanContext<'a> {
    pub battlefield: &'a Battlefield,
    pub policy: &'a dyn OccupancyPolicy,
    pub options: PlanningOptions,
}

impl<'a> PlanContext<'a> {
    pub fn new(battlefield: &'a Battlefield, policy: &'a dyn OccupancyPolicy) -> Self {
        Self {
            battlefield,
            policy,
            options: PlanningOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlanningOptions) -> Self {
        self.options = options;
        self
    }
}

/// Why a planning call produced no route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathFailure {
    /// Target footprint leaves the map
    OutOfBounds,
    /// Unit cannot stand at the target
    FootprintBlocked,
    /// Search exhausted without reaching the target within the TU cap
    NoRoute,
    /// Unit has no means of moving
    Immobile,
}

/// Distinguishes the two causes folded into `PathFailure::NoRoute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoRouteReason {
    /// A route exists but costs more than allowed
    InsufficientTimeUnits,
    Unreachable,
}

/// A planned route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// Steps from the origin, in walking order
    pub directions: Vec<Direction>,
    /// Resolved target the route ends at
    pub destination: Position,
    /// TU the route costs at normal pace
    pub total_tu: TimeUnits,
    /// Part of `total_tu` spent opening doors
    pub door_tu: TimeUnits,
    pub strafe: bool,
    pub dash: bool,
    /// Unit a guided projectile was routed toward
    pub launch_target: Option<UnitId>,
    pub failure: Option<PathFailure>,
}

impl PathResult {
    fn failed(origin: Position, failure: PathFailure) -> Self {
        Self {
            directions: Vec::new(),
            destination: origin,
            total_tu: 0,
            door_tu: 0,
            strafe: false,
            dash: false,
            launch_target: None,
            failure: Some(failure),
        }
    }

    fn stay(origin: Position) -> Self {
        Self {
            failure: None,
            ..Self::failed(origin, PathFailure::NoRoute)
        }
    }

    pub fn is_found(&self) -> bool {
        self.failure.is_none()
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

/// A cell the unit can reach this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reachable {
    pub position: Position,
    pub cost: TimeUnits,
}

/// Outcome of one A* run
enum SearchOutcome {
    Found(usize),
    NotFound,
    /// Reached the target, but a strafed vehicle would have to turn
    FacingRejected,
}

/// How one A* run prices and checks its steps
#[derive(Debug, Clone, Copy)]
struct SearchMode {
    strafe: bool,
    enforce_facing: bool,
    /// Order the open set by search cost (fire, same-level preference)
    /// rather than by the TU actually spent
    penalized: bool,
}

/// Planner owning the node pool of one battlefield
///
/// Calls are sequential: every call resets the pool before searching.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    pool: NodePool,
    config: PlannerConfig,
}

impl Pathfinder {
    pub fn new(battlefield: &Battlefield, config: PlannerConfig) -> Self {
        Self {
            pool: NodePool::new(battlefield),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a route for `unit` to `request.target`
    ///
    /// Unreachable targets are not errors: the result carries a failure
    /// and no directions. Errors mean the inputs themselves are corrupt.
    pub fn calculate_path(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
    ) -> Result<PathResult> {
        self.check_inputs(ctx.battlefield, unit)?;
        tracing::debug!(
            "Planning {} from {} to {} (cap {})",
            unit.unit,
            unit.position,
            request.target,
            request.tu_cap
        );

        let result = self.plan(ctx, unit, request)?;

        match result.failure {
            None => tracing::debug!(
                "Planned {} steps for {} costing {} TU",
                result.len(),
                unit.unit,
                result.total_tu
            ),
            Some(failure) => tracing::debug!("No path for {} to {}: {:?}", unit.unit, request.target, failure),
        }
        Ok(result)
    }

    fn plan(&mut self, ctx: &PlanContext<'_>, unit: &MovementProfile, request: &PathRequest) -> Result<PathResult> {
        let evaluator = StepEvaluator::new(ctx.battlefield, &self.config, ctx.policy)
            .with_launch_target(request.launch_target);
        let movement = evaluator.movement_of(unit);
        if movement == MovementType::None {
            return Ok(PathResult::failed(unit.position, PathFailure::Immobile));
        }
        if !ctx.battlefield.footprint_in_bounds(request.target, unit.footprint) {
            return Ok(PathResult::failed(unit.position, PathFailure::OutOfBounds));
        }

        let target = resolve_target(ctx.battlefield, request.target, unit, movement);
        if target != request.target {
            tracing::trace!("Target {} resolved to {}", request.target, target);
        }
        if !self.target_is_standable(&evaluator, unit, target, movement) {
            return Ok(PathResult::failed(unit.position, PathFailure::FootprintBlocked));
        }
        if target == unit.position {
            return Ok(PathResult::stay(unit.position));
        }

        if self.strafe_eligible(ctx, unit, request, target) {
            if let Some(result) = self.try_strafed_plan(ctx, unit, request, target)? {
                return Ok(result);
            }
            tracing::trace!("No strafed route for {}, replanning without strafe", unit.unit);
        }
        self.try_plain_plan(ctx, unit, request, target)
    }

    /// Strafed search; `None` when the surcharge busts the cap or the
    /// route would force a vehicle to turn
    fn try_strafed_plan(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
    ) -> Result<Option<PathResult>> {
        let mode = SearchMode {
            strafe: true,
            enforce_facing: unit.vehicle || unit.footprint.is_large(),
            penalized: true,
        };
        match self.search_within_cap(ctx, unit, request, target, mode)? {
            SearchOutcome::Found(index) => Ok(Some(self.finish(ctx, unit, request, target, index, true))),
            SearchOutcome::NotFound | SearchOutcome::FacingRejected => Ok(None),
        }
    }

    fn try_plain_plan(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
    ) -> Result<PathResult> {
        let mode = SearchMode {
            strafe: false,
            enforce_facing: false,
            penalized: true,
        };
        match self.search_within_cap(ctx, unit, request, target, mode)? {
            SearchOutcome::Found(index) => Ok(self.finish(ctx, unit, request, target, index, false)),
            SearchOutcome::NotFound | SearchOutcome::FacingRejected => {
                Ok(PathResult::failed(unit.position, PathFailure::NoRoute))
            }
        }
    }

    /// Penalised search, retried on spent TU alone when it finds nothing
    ///
    /// A route the penalties steer away from may be the only one within the cap.
    fn search_within_cap(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
        mode: SearchMode,
    ) -> Result<SearchOutcome> {
        let outcome = self.search(ctx, unit, request, target, mode)?;
        let penalties_apply = ctx.options.prefer_same_level || (unit.avoids_fire && !unit.fire_immune);
        if !matches!(outcome, SearchOutcome::NotFound) || !penalties_apply || request.tu_cap == TimeUnits::MAX {
            return Ok(outcome);
        }
        tracing::trace!(
            "Penalised search for {} found nothing within {} TU, retrying on spent TU",
            unit.unit,
            request.tu_cap
        );
        self.search(
            ctx,
            unit,
            request,
            target,
            SearchMode {
                penalized: false,
                ..mode
            },
        )
    }

    fn finish(
        &self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
        index: usize,
        strafe: bool,
    ) -> PathResult {
        let directions = self.pool.directions_to(index);

        let evaluator = StepEvaluator::new(ctx.battlefield, &self.config, ctx.policy)
            .with_launch_target(request.launch_target)
            .strafing(strafe);
        let mut position = unit.position;
        let mut door_tu = 0;
        for &direction in &directions {
            let Some(step) = evaluator.step(unit, position, direction).planned() else {
                tracing::warn!(
                    "Planned step {:?} from {} for {} no longer replays",
                    direction,
                    position,
                    unit.unit
                );
                break;
            };
            door_tu += step.cost.door;
            position = step.destination;
        }

        let dash = ctx.options.allow_dash && !unit.footprint.is_large() && directions.len() > 1;
        PathResult {
            total_tu: self.pool.node(index).cost,
            door_tu,
            strafe,
            dash,
            launch_target: request.launch_target,
            destination: target,
            directions,
            failure: None,
        }
    }

    /// Single-target A* bounded by `request.tu_cap`
    fn search(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
        mode: SearchMode,
    ) -> Result<SearchOutcome> {
        let battlefield = ctx.battlefield;
        let evaluator = StepEvaluator::new(battlefield, &self.config, ctx.policy)
            .with_launch_target(request.launch_target)
            .strafing(mode.strafe);
        let movement = evaluator.movement_of(unit);
        let cheapest = battlefield.cheapest_entry(movement, self.config.unknown_floor_cost, self.config.climb_cost);
        let heuristic = |pos: Position| cheapest.saturating_mul(pos.chebyshev_distance(&target));

        self.pool.reset();
        let start = self.cell_index(battlefield, unit)?;
        self.pool.node_mut(start).connect(0, 0, 0, None, None);
        self.pool.push_open(heuristic(unit.position), start);

        while let Some(index) = self.pool.pop_open() {
            let current = self.pool.node_mut(index);
            current.visited = true;
            current.open = false;
            let (position, cost, score, energy) = (current.position, current.cost, current.score, current.energy);

            if position == target {
                if mode.enforce_facing && !self.keeps_facing(index, unit.facing) {
                    return Ok(SearchOutcome::FacingRejected);
                }
                return Ok(SearchOutcome::Found(index));
            }

            for direction in Direction::ALL {
                let Some(step) = evaluator.step(unit, position, direction).planned() else {
                    continue;
                };
                let Some(next) = battlefield.index_of(step.destination) else {
                    continue;
                };
                if self.pool.node(next).visited {
                    continue;
                }

                let spent = step.cost.spend(false, unit.agility);
                let next_cost = cost.saturating_add(spent.time);
                if next_cost > request.tu_cap {
                    continue;
                }
                let next_score = if mode.penalized {
                    let mut weighted = score.saturating_add(step.cost.time);
                    if ctx.options.prefer_same_level
                        && step.direction.is_diagonal()
                        && step.destination.z == position.z
                    {
                        weighted = weighted.saturating_add(self.config.same_level_penalty);
                    }
                    weighted
                } else {
                    next_cost
                };

                if next_score < self.pool.node(next).score {
                    self.pool.node_mut(next).connect(
                        next_cost,
                        next_score,
                        energy.saturating_add(spent.energy),
                        Some(index),
                        Some(step.direction),
                    );
                    self.pool
                        .push_open(next_score.saturating_add(heuristic(step.destination)), next);
                }
            }
        }

        Ok(SearchOutcome::NotFound)
    }

    /// Every horizontal step runs along the facing axis
    fn keeps_facing(&self, index: usize, facing: Direction) -> bool {
        self.pool
            .directions_to(index)
            .iter()
            .filter(|d| !d.is_vertical())
            .all(|d| facing.is_collinear(*d))
    }

    /// Every cell `unit` can reach within `tu_cap` and its energy, cheapest first
    ///
    /// The unit's own cell is always included at cost 0.
    pub fn find_reachable(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        tu_cap: TimeUnits,
    ) -> Result<Vec<Reachable>> {
        self.check_inputs(ctx.battlefield, unit)?;
        let battlefield = ctx.battlefield;
        let evaluator = StepEvaluator::new(battlefield, &self.config, ctx.policy);

        self.pool.reset();
        let start = self.cell_index(battlefield, unit)?;
        self.pool.node_mut(start).connect(0, 0, 0, None, None);
        self.pool.push_open(0, start);

        let mut reachable = Vec::new();
        while let Some(index) = self.pool.pop_open() {
            let current = self.pool.node_mut(index);
            current.visited = true;
            current.open = false;
            let (position, cost, energy) = (current.position, current.cost, current.energy);
            reachable.push(Reachable { position, cost });

            if !unit.is_mobile() {
                break;
            }
            for direction in Direction::ALL {
                let Some(step) = evaluator.step(unit, position, direction).planned() else {
                    continue;
                };
                let Some(next) = battlefield.index_of(step.destination) else {
                    continue;
                };
                if self.pool.node(next).visited {
                    continue;
                }

                let spent = step.cost.spend(false, unit.agility);
                let next_cost = cost.saturating_add(spent.time);
                let next_energy = energy.saturating_add(spent.energy);
                if next_cost > tu_cap || next_energy > unit.energy {
                    continue;
                }
                if next_cost < self.pool.node(next).cost {
                    self.pool
                        .node_mut(next)
                        .connect(next_cost, next_cost, next_energy, Some(index), Some(step.direction));
                    self.pool.push_open(next_cost, next);
                }
            }
        }

        reachable.sort_by_key(|r| r.cost);
        tracing::debug!("{} can reach {} cells within {} TU", unit.unit, reachable.len(), tu_cap);
        Ok(reachable)
    }

    /// Tell "too expensive" apart from "no way through" for a failed request
    pub fn classify_failure(
        &mut self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
    ) -> Result<NoRouteReason> {
        let unbounded = PathRequest {
            tu_cap: TimeUnits::MAX,
            ..*request
        };
        let result = self.calculate_path(ctx, unit, &unbounded)?;
        Ok(if result.is_found() {
            NoRouteReason::InsufficientTimeUnits
        } else {
            NoRouteReason::Unreachable
        })
    }

    /// Annotate `path` for display by replaying it step by step
    ///
    /// `reserve` is the TU the unit wants to keep for actions at the end.
    pub fn preview_path(
        &self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        path: &PathResult,
        reserve: TimeUnits,
    ) -> Result<PathPreview> {
        if !ctx.battlefield.footprint_in_bounds(unit.position, unit.footprint) {
            return Err(self.out_of_bounds(unit));
        }
        let evaluator = StepEvaluator::new(ctx.battlefield, &self.config, ctx.policy)
            .with_launch_target(path.launch_target)
            .strafing(path.strafe);
        Ok(PathPreview::annotate(&evaluator, &self.config, unit, path, reserve))
    }

    fn check_inputs(&self, battlefield: &Battlefield, unit: &MovementProfile) -> Result<()> {
        if !self.pool.fits(battlefield) {
            tracing::warn!(
                "Node pool of {} cells used with a battlefield of {} cells",
                self.pool.len(),
                battlefield.cell_count()
            );
            return Err(PlannerError::PoolMismatch {
                pool: self.pool.len(),
                cells: battlefield.cell_count(),
            });
        }
        if !battlefield.footprint_in_bounds(unit.position, unit.footprint) {
            return Err(self.out_of_bounds(unit));
        }
        Ok(())
    }

    fn cell_index(&self, battlefield: &Battlefield, unit: &MovementProfile) -> Result<usize> {
        battlefield
            .index_of(unit.position)
            .ok_or_else(|| self.out_of_bounds(unit))
    }

    fn out_of_bounds(&self, unit: &MovementProfile) -> PlannerError {
        tracing::warn!("{} stands outside the battlefield at {}", unit.unit, unit.position);
        PlannerError::UnitOutOfBounds {
            unit: unit.unit,
            position: unit.position,
        }
    }

    /// Can the unit stand with its anchor at `target`?
    fn target_is_standable(
        &self,
        evaluator: &StepEvaluator<'_>,
        unit: &MovementProfile,
        target: Position,
        movement: MovementType,
    ) -> bool {
        let battlefield = evaluator.battlefield();
        if unit
            .footprint
            .cells(target)
            .any(|cell| evaluator.cell_blocked(unit, cell, movement))
        {
            return false;
        }
        if !unit.footprint.is_large() {
            return true;
        }

        let foreign = unit.footprint.cells(target).any(|cell| {
            battlefield
                .occupant_at(cell)
                .is_some_and(|o| o.id != unit.unit && !o.downed)
        });
        !foreign
            && !evaluator.straddles_door(target)
            && !evaluator.passage_blocked(target.offset(1, 1, 0), Direction::NorthWest, movement)
            && !evaluator.passage_blocked(target.offset(1, 0, 0), Direction::SouthWest, movement)
    }

    fn strafe_eligible(
        &self,
        ctx: &PlanContext<'_>,
        unit: &MovementProfile,
        request: &PathRequest,
        target: Position,
    ) -> bool {
        if !ctx.options.allow_strafe || request.reject_strafe {
            return false;
        }
        let origin = unit.position;
        if target.z != origin.z || (target.x - origin.x).abs() > 1 || (target.y - origin.y).abs() > 1 {
            return false;
        }
        let level = |pos: Position| {
            ctx.battlefield
                .tile(pos)
                .map(|t| i32::from(t.terrain_level()))
                .unwrap_or(0)
        };
        let delta = (level(origin) - level(target)).abs();
        if unit.vehicle {
            delta == 0
        } else {
            delta <= self.config.max_step_height
        }
    }
}

/// Move a requested target onto something the unit can stand on
///
/// Full-height tiles push the target up; walkers then drop through open air.
fn resolve_target(
    battlefield: &Battlefield,
    requested: Position,
    unit: &MovementProfile,
    movement: MovementType,
) -> Position {
    let mut target = requested;
    while target.z + 1 < battlefield.height()
        && battlefield
            .tile(target)
            .is_some_and(|t| t.terrain_level() == FULL_HEIGHT_LEVEL)
    {
        target = target.above();
    }
    if movement != MovementType::Fly {
        while battlefield.can_fall(target, unit.footprint) {
            target = target.below();
        }
    }
    target
}
