//! Content importers.

pub mod scenario_bundle;

pub use scenario_bundle::{ImportError, ImportSummary, ScenarioBundle};
