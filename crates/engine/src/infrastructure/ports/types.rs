//! Result types returned by repository ports.

use whodunit_domain::{ObjectId, ObjectProgress};

/// Outcome of an atomic budget charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// One question was spent; carries the new remaining count.
    Charged(u32),
    /// The budget was already at zero; nothing changed.
    Exhausted,
    /// The playthrough is no longer in progress; nothing changed.
    Concluded,
}

/// Outcome of an atomic investigation start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The object became the playthrough's active investigation.
    Started(ObjectProgress),
    /// The object was already active; nothing changed.
    AlreadyStarted(ObjectProgress),
    /// A different object is active; nothing changed.
    Conflict { active_object_id: ObjectId },
}
