//! Core use-case services.
//!
//! # Responsibility
//! - Project stored cases into decorated views and queues.
//! - Apply the note, close and intake transitions.
//! - Orchestrate the load -> transition -> save cycle behind `CaseService`.
//!
//! # Invariants
//! - Projections (`decorator`, `queue`) are pure and never touch storage.
//! - Each mutating call applies exactly one transition and saves once.

pub mod case_service;
pub mod decorator;
pub mod intake;
pub mod lifecycle;
pub mod queue;
pub mod timeline;
pub mod validation;
