//! Property tests: planner costs against brute-force relaxation

use std::collections::HashMap;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tactical_planner::battle::*;
use tactical_planner::core::{PlannerConfig, UnitId};

/// Small single-level map described by one code per cell
#[derive(Debug, Clone)]
struct MapLayout {
    width: i32,
    length: i32,
    cells: Vec<u8>,
}

fn map_layout() -> impl Strategy<Value = MapLayout> {
    (3i32..7, 3i32..7).prop_flat_map(|(width, length)| {
        prop::collection::vec(0u8..14, (width * length) as usize).prop_map(move |cells| MapLayout {
            width,
            length,
            cells,
        })
    })
}

/// Two-level map: ground codes plus upper-floor codes per column
#[derive(Debug, Clone)]
struct LayeredLayout {
    width: i32,
    length: i32,
    ground: Vec<u8>,
    upper: Vec<u8>,
}

fn layered_layout() -> impl Strategy<Value = LayeredLayout> {
    (3i32..6, 3i32..6).prop_flat_map(|(width, length)| {
        let cells = (width * length) as usize;
        (
            prop::collection::vec(0u8..12, cells),
            prop::collection::vec(0u8..6, cells),
        )
            .prop_map(move |(ground, upper)| LayeredLayout {
                width,
                length,
                ground,
                upper,
            })
    })
}

/// Cells with `x < clear && y < clear` stay open so the unit can stand there
fn build(layout: &MapLayout, clear: i32) -> Battlefield {
    let mut battlefield = Battlefield::with_ground(layout.width, layout.length, 1, MapPart::floor(4)).unwrap();
    for (i, &code) in layout.cells.iter().enumerate() {
        let pos = Position::new(i as i32 % layout.width, i as i32 / layout.width, 0);
        if pos.x < clear && pos.y < clear {
            continue;
        }
        match code {
            6 => battlefield.set_floor(pos, Some(MapPart::floor(6))),
            7 => battlefield.set_wall(pos, WallSide::West, Some(MapPart::wall(4))),
            8 => battlefield.set_wall(pos, WallSide::North, Some(MapPart::solid_wall())),
            9 => battlefield.set_object(pos, Some(MapPart::object(IMPASSABLE_COST, 0))),
            10 => battlefield.set_wall(pos, WallSide::West, Some(MapPart::solid_wall())),
            11 => battlefield.set_floor(pos, None),
            12 => battlefield.set_wall(pos, WallSide::North, Some(MapPart::door(DoorKind::Hinge, 3))),
            13 => battlefield.set_object(pos, Some(MapPart::big_wall(BigWall::NeSw))),
            _ => {}
        }
    }
    battlefield
}

/// Ground with steps, stairs, ledges and gravlifts under a patchy upper floor
///
/// No object is full height, so requested targets only ever resolve downward.
fn build_layered(layout: &LayeredLayout) -> Battlefield {
    let mut battlefield = Battlefield::with_ground(layout.width, layout.length, 2, MapPart::floor(4)).unwrap();
    for i in 0..layout.ground.len() {
        let ground = Position::new(i as i32 % layout.width, i as i32 / layout.width, 0);
        let upper = ground.above();
        if layout.upper[i] >= 3 {
            battlefield.set_floor(upper, Some(MapPart::floor(4)));
        }
        if ground == Position::default() {
            continue;
        }
        match layout.ground[i] {
            5 => battlefield.set_object(ground, Some(MapPart::object(2, -8))),
            6 => battlefield.set_object(ground, Some(MapPart::object(2, STAIRS_LEVEL))),
            7 => battlefield.set_object(ground, Some(MapPart::object(2, DROP_LEVEL))),
            8 => battlefield.set_wall(ground, WallSide::West, Some(MapPart::wall(4))),
            9 => battlefield.set_wall(ground, WallSide::North, Some(MapPart::solid_wall())),
            10 => battlefield.set_object(ground, Some(MapPart::object(IMPASSABLE_COST, 0))),
            11 => {
                battlefield.set_floor(ground, Some(MapPart::gravlift(4)));
                battlefield.set_floor(upper, Some(MapPart::gravlift(4)));
            }
            _ => {}
        }
    }
    battlefield
}

/// Cheapest TU to every cell by relaxing all edges until nothing changes
fn brute_force(battlefield: &Battlefield, unit: &MovementProfile) -> HashMap<Position, u32> {
    let config = PlannerConfig::default();
    let evaluator = StepEvaluator::new(battlefield, &config, &SolidOccupants);
    let mut best = HashMap::from([(unit.position, 0u32)]);
    loop {
        let mut changed = false;
        let snapshot: Vec<_> = best.iter().map(|(p, c)| (*p, *c)).collect();
        for (position, cost) in snapshot {
            for direction in Direction::ALL {
                let Some(step) = evaluator.step(unit, position, direction).planned() else {
                    continue;
                };
                let next = cost + step.cost.spend(false, unit.agility).time;
                if next < best.get(&step.destination).copied().unwrap_or(u32::MAX) {
                    best.insert(step.destination, next);
                    changed = true;
                }
            }
        }
        if !changed {
            return best;
        }
    }
}

/// Where a walker's requested target lands
fn landing(battlefield: &Battlefield, unit: &MovementProfile, mut target: Position) -> Position {
    while battlefield.can_fall(target, unit.footprint) {
        target = target.below();
    }
    target
}

fn unit_at_origin(footprint: Footprint) -> MovementProfile {
    MovementProfile::new(UnitId::new(), Position::default())
        .with_budget(255, u32::MAX / 2)
        .with_footprint(footprint)
}

fn check_reachable(battlefield: &Battlefield, unit: &MovementProfile, cap: u32) -> Result<(), TestCaseError> {
    let ctx = PlanContext::new(battlefield, &SolidOccupants);
    let mut pathfinder = Pathfinder::new(battlefield, PlannerConfig::default());

    let reachable = pathfinder.find_reachable(&ctx, unit, cap).unwrap();
    let expected = brute_force(battlefield, unit);

    prop_assert_eq!(reachable[0], Reachable { position: unit.position, cost: 0 });
    for cell in &reachable {
        prop_assert_eq!(Some(&cell.cost), expected.get(&cell.position));
    }
    let within_cap = expected.values().filter(|&&c| c <= cap).count();
    prop_assert_eq!(reachable.len(), within_cap);
    Ok(())
}

fn check_plan(
    battlefield: &Battlefield,
    unit: &MovementProfile,
    requested: Position,
    cap: u32,
) -> Result<(), TestCaseError> {
    let ctx = PlanContext::new(battlefield, &SolidOccupants);
    let config = PlannerConfig::default();
    let mut pathfinder = Pathfinder::new(battlefield, config.clone());

    let path = pathfinder
        .calculate_path(&ctx, unit, &PathRequest::new(requested, cap))
        .unwrap();
    let expected = brute_force(battlefield, unit);
    let target = landing(battlefield, unit, requested);

    match expected.get(&target) {
        Some(&best) if best <= cap => {
            prop_assert!(path.is_found());
            prop_assert_eq!(path.total_tu, best);
            prop_assert_eq!(path.destination, target);
        }
        _ => prop_assert!(!path.is_found()),
    }

    if path.is_found() {
        prop_assert!(path.total_tu <= cap);
        let evaluator = StepEvaluator::new(battlefield, &config, &SolidOccupants);
        let mut position = unit.position;
        let mut replayed = 0;
        for &direction in &path.directions {
            let step = evaluator.step(unit, position, direction).planned();
            prop_assert!(step.is_some());
            let step = step.unwrap();
            replayed += step.cost.spend(false, unit.agility).time;
            position = step.destination;
        }
        prop_assert_eq!(replayed, path.total_tu);
        prop_assert_eq!(position, target);
    } else {
        prop_assert!(path.directions.is_empty());
    }
    Ok(())
}

proptest! {
    #[test]
    fn reachable_costs_are_minimal(layout in map_layout(), cap in 0u32..40) {
        let battlefield = build(&layout, 1);
        check_reachable(&battlefield, &unit_at_origin(Footprint::Small), cap)?;
    }

    #[test]
    fn planned_paths_are_optimal_and_replayable(
        layout in map_layout(),
        tx in 0i32..7,
        ty in 0i32..7,
        cap in 0u32..60,
    ) {
        let battlefield = build(&layout, 1);
        let target = Position::new(tx % layout.width, ty % layout.length, 0);
        check_plan(&battlefield, &unit_at_origin(Footprint::Small), target, cap)?;
    }

    #[test]
    fn layered_reachable_costs_are_minimal(layout in layered_layout(), cap in 0u32..50) {
        let battlefield = build_layered(&layout);
        check_reachable(&battlefield, &unit_at_origin(Footprint::Small), cap)?;
    }

    #[test]
    fn layered_paths_are_optimal_and_replayable(
        layout in layered_layout(),
        tx in 0i32..6,
        ty in 0i32..6,
        tz in 0i32..2,
        cap in 0u32..60,
    ) {
        let battlefield = build_layered(&layout);
        let target = Position::new(tx % layout.width, ty % layout.length, tz);
        check_plan(&battlefield, &unit_at_origin(Footprint::Small), target, cap)?;
    }

    #[test]
    fn large_reachable_costs_are_minimal(layout in map_layout(), cap in 0u32..50) {
        let battlefield = build(&layout, 2);
        check_reachable(&battlefield, &unit_at_origin(Footprint::Large), cap)?;
    }

    #[test]
    fn large_paths_are_optimal_and_replayable(
        layout in map_layout(),
        tx in 0i32..7,
        ty in 0i32..7,
        cap in 0u32..60,
    ) {
        let battlefield = build(&layout, 2);
        let target = Position::new(tx % layout.width, ty % layout.length, 0);
        check_plan(&battlefield, &unit_at_origin(Footprint::Large), target, cap)?;
    }
}
