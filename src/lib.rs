//! Automated engagement and risk-adaptive negotiation engine for overdue
//! loan recovery.
//!
//! The engine contacts overdue borrowers, classifies their replies with a
//! deterministic keyword rubric, and negotiates restructured repayment
//! plans: a primary offer, an automatic more-lenient revision after a
//! rejection, and an explicit restore path back to the original terms.
//! Everything on the borrower side flows through a per-borrower lock, so
//! inbound replies, outreach cycles, and manager actions never race.
//!
//! Layering follows ports-and-adapters:
//!
//! - [`domain`]: pure business logic (state machines, rubric, plan math)
//! - [`ports`]: trait seams to storage, delivery, and notifications
//! - [`application`]: handlers orchestrating domain objects through ports
//! - [`adapters`]: in-memory implementations and the SMS gateway
//! - [`config`]: environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
