//! Domain layer: pure business logic, no I/O.

pub mod borrower;
pub mod classifier;
pub mod conversation;
pub mod delivery;
pub mod foundation;
pub mod plan;
