//! Domain model for the agency: cats, missions and their targets.
//!
//! # Responsibility
//! - Define canonical records returned by repositories and services.
//! - Define input shapes (drafts, patches, change sets) accepted by services.
//! - Own field-level validation that does not need storage access.
//!
//! # Invariants
//! - Every record is identified by a stable UUID generated by core.
//! - Input shapes are normalized (trimmed, rescaled) before persistence.

pub mod cat;
pub mod mission;
pub mod validation;
