//! Loading plans: which container goes where, and what each slot can take.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::profile::AircraftProfile;

/// One planned container: identity, declared weight, target slot code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub container_id: String,
    pub expected_weight_kg: f32,
    pub expected_slot_code: String,
}

/// Operational loading plan for one flight: entries keyed by container id
/// plus a per-slot weight limit table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadingPlan {
    entries: HashMap<String, PlanEntry>,
    weight_limits: HashMap<String, f32>,
}

impl LoadingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for a container (last write wins).
    pub fn upsert_entry(&mut self, entry: PlanEntry) {
        self.entries.insert(entry.container_id.clone(), entry);
    }

    pub fn entry(&self, container_id: &str) -> Option<&PlanEntry> {
        self.entries.get(container_id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.values()
    }

    pub fn set_weight_limit(&mut self, code: impl Into<String>, kg: f32) {
        self.weight_limits.insert(code.into(), kg);
    }

    /// Max weight for a slot code. Unconfigured codes are unlimited
    /// (`f32::MAX`), so the weight check always passes there.
    pub fn max_weight_for(&self, code: &str) -> f32 {
        self.weight_limits.get(code).copied().unwrap_or(f32::MAX)
    }

    /// Replace the whole limit table with a profile's limits. Entries are
    /// untouched.
    pub fn apply_profile_limits(&mut self, profile: &AircraftProfile) {
        self.weight_limits = profile.weight_limits.clone();
    }

    /// Built-in fallback plan for demo sessions without a plan file:
    /// two containers on a four-row ramp, 5000 kg limits everywhere.
    pub fn demo_plan() -> Self {
        let mut plan = Self::new();
        plan.upsert_entry(PlanEntry {
            container_id: "AKE123".into(),
            expected_weight_kg: 4800.0,
            expected_slot_code: "2R".into(),
        });
        plan.upsert_entry(PlanEntry {
            container_id: "AKE456".into(),
            expected_weight_kg: 3000.0,
            expected_slot_code: "1L".into(),
        });
        for row in 1..=4 {
            plan.set_weight_limit(format!("{row}L"), 5000.0);
            plan.set_weight_limit(format!("{row}R"), 5000.0);
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{uniform_limits, AircraftProfile};

    #[test]
    fn demo_plan_contents() {
        let plan = LoadingPlan::demo_plan();
        assert_eq!(plan.entry_count(), 2);
        let ake = plan.entry("AKE123").unwrap();
        assert_eq!(ake.expected_slot_code, "2R");
        assert_eq!(ake.expected_weight_kg, 4800.0);
        assert_eq!(plan.max_weight_for("4R"), 5000.0);
    }

    #[test]
    fn upsert_last_write_wins() {
        let mut plan = LoadingPlan::new();
        plan.upsert_entry(PlanEntry {
            container_id: "AKE1".into(),
            expected_weight_kg: 1000.0,
            expected_slot_code: "1L".into(),
        });
        plan.upsert_entry(PlanEntry {
            container_id: "AKE1".into(),
            expected_weight_kg: 1200.0,
            expected_slot_code: "2R".into(),
        });
        assert_eq!(plan.entry_count(), 1);
        assert_eq!(plan.entry("AKE1").unwrap().expected_slot_code, "2R");
    }

    #[test]
    fn missing_limit_is_unlimited() {
        let plan = LoadingPlan::new();
        assert_eq!(plan.max_weight_for("9R"), f32::MAX);
    }

    #[test]
    fn profile_limits_replace_the_table() {
        let mut plan = LoadingPlan::demo_plan();
        assert_eq!(plan.max_weight_for("1L"), 5000.0);

        let profile = AircraftProfile::new("Test", 6.0, 10.0, 2, uniform_limits(2, 1500.0));
        plan.apply_profile_limits(&profile);

        assert_eq!(plan.max_weight_for("1L"), 1500.0);
        // Rows outside the profile lose their old limits entirely.
        assert_eq!(plan.max_weight_for("4R"), f32::MAX);
        // Entries survive.
        assert_eq!(plan.entry_count(), 2);
    }
}
