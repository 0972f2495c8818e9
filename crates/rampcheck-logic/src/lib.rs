//! Pure placement-validation logic for RampCheck.
//!
//! This crate contains all ramp logic that is independent of any AR
//! runtime, renderer, or UI. Functions take plain data and return results,
//! making them unit-testable and portable across the mobile host, native
//! CLI tools, and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`convert`] | Ramp frame: world pose to local point, slot, and back |
//! | [`evaluate`] | Plan conformance, weight limits, occupancy, suggestions |
//! | [`plan`] | Loading plan entries and per-slot weight limits |
//! | [`plan_text`] | Line-oriented loading plan text format |
//! | [`pose`] | Rigid-body pose values (translation + rotation) |
//! | [`profile`] | Aircraft ramp profiles and the type catalog |
//! | [`slot`] | Discrete slot identifiers (row + side) |

pub mod convert;
pub mod evaluate;
pub mod plan;
pub mod plan_text;
pub mod pose;
pub mod profile;
pub mod slot;
