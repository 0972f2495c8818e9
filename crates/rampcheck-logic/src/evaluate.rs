//! Placement evaluation: plan conformance, weight limits, occupancy, and
//! nearest-valid suggestions.
//!
//! Per placement event:
//! 1. Look up the container's plan entry and compare actual vs expected
//!    slot code (case-insensitive).
//! 2. Check the weight against the actual slot's limit.
//! 3. Record occupancy. A container moving slots frees its old slot, so
//!    the table stays one-to-one.
//! 4. If either check failed, search for the nearest free slot that can
//!    take the weight.
//!
//! Failing checks are the expected negative branch of a working session,
//! so they are result fields, never errors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::plan::LoadingPlan;
use crate::slot::{Side, Slot};

/// Outcome of evaluating one placement event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Actual slot matches the planned slot (false for unplanned containers).
    pub position_matches: bool,
    /// Weight is within the actual slot's limit.
    pub weight_ok: bool,
    /// Both checks passed.
    pub overall_ok: bool,
    pub actual: Slot,
    /// Planned slot, when the container is in the plan and its code parses.
    pub expected: Option<Slot>,
    /// Nearest free slot that can take the weight, when the placement failed.
    pub suggested: Option<Slot>,
}

/// Stateful evaluator: the loading plan plus the live occupancy table.
#[derive(Debug, Clone)]
pub struct PlacementEvaluator {
    plan: LoadingPlan,
    total_rows: u32,
    slot_to_container: HashMap<Slot, String>,
    container_to_slot: HashMap<String, Slot>,
}

impl PlacementEvaluator {
    /// # Panics
    /// If `total_rows` is zero.
    pub fn new(plan: LoadingPlan, total_rows: u32) -> Self {
        assert!(total_rows > 0, "ramp must have at least one row");
        Self {
            plan,
            total_rows,
            slot_to_container: HashMap::new(),
            container_to_slot: HashMap::new(),
        }
    }

    pub fn plan(&self) -> &LoadingPlan {
        &self.plan
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    /// Evaluate a placement event and record the container's new slot.
    pub fn evaluate(&mut self, container_id: &str, weight_kg: f32, actual: Slot) -> Evaluation {
        let actual_code = actual.code();
        let entry = self.plan.entry(container_id);
        let position_matches = entry
            .map_or(false, |e| e.expected_slot_code.eq_ignore_ascii_case(&actual_code));
        let expected = entry.and_then(|e| Slot::parse(&e.expected_slot_code));

        let weight_ok = weight_kg <= self.plan.max_weight_for(&actual_code);

        self.register(container_id, actual);

        let overall_ok = position_matches && weight_ok;
        let suggested = if overall_ok {
            None
        } else {
            self.nearest_free_slot(weight_kg, actual)
        };

        Evaluation {
            position_matches,
            weight_ok,
            overall_ok,
            actual,
            expected,
            suggested,
        }
    }

    /// Container currently registered at a slot.
    pub fn occupant_of(&self, slot: Slot) -> Option<&str> {
        self.slot_to_container.get(&slot).map(String::as_str)
    }

    /// Slot a container is currently registered at.
    pub fn slot_of(&self, container_id: &str) -> Option<Slot> {
        self.container_to_slot.get(container_id).copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.slot_to_container.len()
    }

    /// Record that a container now sits at `slot`, keeping the occupancy
    /// maps one-to-one: the container's previous slot is freed, and a
    /// container displaced from `slot` is dropped from the table (its real
    /// location is no longer known).
    fn register(&mut self, container_id: &str, slot: Slot) {
        if let Some(prev) = self.container_to_slot.remove(container_id) {
            self.slot_to_container.remove(&prev);
        }
        if let Some(displaced) = self.slot_to_container.insert(slot, container_id.to_string()) {
            self.container_to_slot.remove(&displaced);
        }
        self.container_to_slot.insert(container_id.to_string(), slot);
    }

    /// Nearest free slot that can take `weight_kg`, measured from `from`.
    /// Distance is the row difference, plus one when the side differs.
    /// Rows are scanned ascending with Left before Right and ties keep the
    /// first candidate, so the result is deterministic.
    fn nearest_free_slot(&self, weight_kg: f32, from: Slot) -> Option<Slot> {
        let mut best: Option<(u32, Slot)> = None;
        for row in 1..=self.total_rows {
            for side in [Side::Left, Side::Right] {
                let candidate = Slot::new(row, side);
                if self.slot_to_container.contains_key(&candidate) {
                    continue;
                }
                if weight_kg > self.plan.max_weight_for(&candidate.code()) {
                    continue;
                }
                let dist = row.abs_diff(from.row) + u32::from(side != from.side);
                if best.map_or(true, |(best_dist, _)| dist < best_dist) {
                    best = Some((dist, candidate));
                }
            }
        }
        best.map(|(_, slot)| slot)
    }
}
