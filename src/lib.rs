//! Tactical Planner - grid movement planning for turn-based battles

pub mod battle;
pub mod core;
