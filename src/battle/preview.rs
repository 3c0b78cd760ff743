//! Per-tile annotations for drawing a planned route

use serde::{Deserialize, Serialize};

use crate::battle::pathfinding::PathResult;
use crate::battle::position::{Direction, Position};
use crate::battle::profile::MovementProfile;
use crate::battle::step_cost::StepEvaluator;
use crate::core::config::PlannerConfig;
use crate::core::types::TimeUnits;

/// Whether the unit can pay for the route up to a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affordability {
    Affordable,
    /// Enough TU to get there, but not enough left for the reserved action
    ReserveViolated,
    Unaffordable,
}

/// One annotated cell of the route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTile {
    pub position: Position,
    /// Direction of the next step; `None` on the final tile
    pub marker: Option<Direction>,
    /// Remaining TU, shown on one quadrant per step
    pub tu_left: Option<i32>,
    pub energy_left: Option<i32>,
    pub affordability: Affordability,
}

/// A replayed route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPreview {
    pub tiles: Vec<PreviewTile>,
    /// TU the route spends, including standing up
    pub total_tu: TimeUnits,
    pub total_energy: u32,
    /// The replay hit a step that is no longer legal
    pub interrupted: bool,
}

impl PathPreview {
    /// Replay `path` through `evaluator`, charging exactly what the walk will
    pub fn annotate(
        evaluator: &StepEvaluator<'_>,
        config: &PlannerConfig,
        unit: &MovementProfile,
        path: &PathResult,
        reserve: TimeUnits,
    ) -> Self {
        let mut preview = PathPreview::default();
        let mut tus = unit.time_units as i32;
        let mut energy = unit.energy as i32;
        if unit.kneeling && !path.is_empty() {
            tus -= config.stand_up_cost as i32;
            preview.total_tu += config.stand_up_cost;
        }

        let mut position = unit.position;
        for (i, &direction) in path.directions.iter().enumerate() {
            let Some(step) = evaluator.step(unit, position, direction).planned() else {
                tracing::debug!("Preview of {} interrupted at {} heading {:?}", unit.unit, position, direction);
                preview.interrupted = true;
                break;
            };
            let spent = step.cost.spend(path.dash, unit.agility);
            tus -= spent.time as i32;
            energy -= spent.energy as i32;
            preview.total_tu += spent.time;
            preview.total_energy += spent.energy;
            position = step.destination;

            let affordability = if tus >= 0 && energy >= 0 {
                if tus - reserve as i32 >= 0 {
                    Affordability::Affordable
                } else {
                    Affordability::ReserveViolated
                }
            } else {
                Affordability::Unaffordable
            };
            let marker = path.directions.get(i + 1).copied();
            let label_quadrant = if unit.footprint.is_large() {
                Position::new(1, 1, 0)
            } else {
                Position::default()
            };

            for quadrant in unit.footprint.quadrants() {
                let labelled = quadrant == label_quadrant;
                preview.tiles.push(PreviewTile {
                    position: position + quadrant,
                    marker,
                    tu_left: labelled.then_some(tus),
                    energy_left: labelled.then_some(energy),
                    affordability,
                });
            }
        }
        preview
    }

    /// Tile carrying the TU label for the final step
    pub fn last_label(&self) -> Option<&PreviewTile> {
        self.tiles.iter().rev().find(|t| t.tu_left.is_some())
    }

    pub fn is_affordable(&self) -> bool {
        !self.interrupted
            && self
                .tiles
                .iter()
                .all(|t| t.affordability == Affordability::Affordable)
    }
}
