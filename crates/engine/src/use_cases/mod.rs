//! Use cases - User story orchestration.
//!
//! Each module contains use cases for one area of play. Use cases authorize
//! the caller, then orchestrate entity modules and ports.

pub mod budget;
pub mod dialogue;
pub mod highlight;
pub mod investigation;
pub mod session;
pub mod world;

pub use budget::GetBudget;
pub use dialogue::DialogueUseCases;
pub use highlight::SetHighlight;
pub use investigation::InvestigationUseCases;
pub use session::SessionUseCases;
pub use world::WorldUseCases;
