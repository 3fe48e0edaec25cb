//! Entity modules - capability wrappers over the store ports.
//!
//! Each module owns one piece of game state and the rules for touching it.
//! Use cases compose them.

pub mod action_budget;
pub mod investigation;
pub mod world_graph;

pub use action_budget::{ActionBudget, BudgetError};
pub use investigation::InvestigationTracker;
pub use world_graph::{WorldError, WorldGraph};
