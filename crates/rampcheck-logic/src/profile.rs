//! Aircraft ramp profiles: deck dimensions, row counts, weight limits.
//!
//! Profiles are plain data in a catalog, so supporting a new aircraft type
//! is a table entry (or a JSON entry), not a code change. Unknown names
//! fall back to the default profile with a warning; a crew scanning an
//! unexpected tail number still gets a working session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ramp geometry and per-slot weight limits for one aircraft type.
///
/// `weight_limits` maps slot codes (`"2R"`) to kilograms. A missing code
/// means the slot is unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub name: String,
    pub ramp_width_m: f32,
    pub ramp_length_m: f32,
    pub total_rows: u32,
    pub weight_limits: HashMap<String, f32>,
}

impl AircraftProfile {
    /// # Panics
    /// If `total_rows` is zero or a dimension is not positive.
    pub fn new(
        name: impl Into<String>,
        ramp_width_m: f32,
        ramp_length_m: f32,
        total_rows: u32,
        weight_limits: HashMap<String, f32>,
    ) -> Self {
        assert!(total_rows > 0, "ramp must have at least one row");
        assert!(
            ramp_width_m > 0.0 && ramp_length_m > 0.0,
            "ramp dimensions must be positive"
        );
        Self {
            name: name.into(),
            ramp_width_m,
            ramp_length_m,
            total_rows,
            weight_limits,
        }
    }

    /// Max weight for a slot code, `f32::MAX` when no limit is configured.
    pub fn weight_limit(&self, code: &str) -> f32 {
        self.weight_limits.get(code).copied().unwrap_or(f32::MAX)
    }

    /// A demo container weight that safely fits the slot's limit. Guided
    /// sessions use this to script placements that should pass.
    pub fn demo_weight_for(&self, code: &str) -> f32 {
        let limit = self.weight_limit(code);
        if limit == f32::MAX {
            3000.0
        } else {
            (limit - 100.0).max(500.0)
        }
    }
}

/// Equal limit for both slots of every row.
pub fn uniform_limits(total_rows: u32, limit_kg: f32) -> HashMap<String, f32> {
    let mut limits = HashMap::new();
    for row in 1..=total_rows {
        limits.insert(format!("{row}L"), limit_kg);
        limits.insert(format!("{row}R"), limit_kg);
    }
    limits
}

/// Per-row limits, row 1 first; both sides share the row's value.
pub fn row_limits(limits_by_row: &[f32]) -> HashMap<String, f32> {
    let mut limits = HashMap::new();
    for (i, &kg) in limits_by_row.iter().enumerate() {
        let row = i as u32 + 1;
        limits.insert(format!("{row}L"), kg);
        limits.insert(format!("{row}R"), kg);
    }
    limits
}

/// Limits falling off linearly from the reference edge: row 1 carries
/// `front_kg`, each following row `step_kg` less.
pub fn graded_limits(total_rows: u32, front_kg: f32, step_kg: f32) -> HashMap<String, f32> {
    let mut limits = HashMap::new();
    for row in 1..=total_rows {
        let kg = front_kg - step_kg * (row - 1) as f32;
        limits.insert(format!("{row}L"), kg);
        limits.insert(format!("{row}R"), kg);
    }
    limits
}

/// Failures loading profile data from JSON.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("profile data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Serde shape of one entry in `data/aircraft_profiles.json`.
#[derive(Debug, Deserialize)]
struct ProfileSpec {
    name: String,
    ramp_width_m: f32,
    ramp_length_m: f32,
    total_rows: u32,
    /// Row-ordered limits, row 1 first; both sides share the row value.
    /// Rows past the end of the list are unlimited.
    row_limits_kg: Vec<f32>,
}

/// Catalog of known aircraft types with a fallback default.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: HashMap<String, AircraftProfile>,
    default: AircraftProfile,
}

impl ProfileCatalog {
    /// The built-in fleet. `Aircraft A` doubles as the fallback default.
    ///
    /// | name        | deck (m) | rows | limits                         |
    /// |-------------|----------|------|--------------------------------|
    /// | Aircraft A  | 8 x 20   | 4    | 1000 kg everywhere             |
    /// | Aircraft B  | 10 x 25  | 5    | 3500/5500/5000/4000/3000 by row|
    /// | Boeing 737  | 6 x 15   | 3    | 2500/4000/3000 by row          |
    /// | Aircraft 40 | 30 x 80  | 20   | 6000 kg front, -200 kg per row |
    pub fn builtin() -> Self {
        let default = AircraftProfile::new("Aircraft A", 8.0, 20.0, 4, uniform_limits(4, 1000.0));
        let mut catalog = Self::with_default(default);
        catalog.register(AircraftProfile::new(
            "Aircraft B",
            10.0,
            25.0,
            5,
            row_limits(&[3500.0, 5500.0, 5000.0, 4000.0, 3000.0]),
        ));
        catalog.register(AircraftProfile::new(
            "Boeing 737",
            6.0,
            15.0,
            3,
            row_limits(&[2500.0, 4000.0, 3000.0]),
        ));
        catalog.register(AircraftProfile::new(
            "Aircraft 40",
            30.0,
            80.0,
            20,
            graded_limits(20, 6000.0, 200.0),
        ));
        catalog
    }

    /// Catalog seeded with only the given default profile.
    pub fn with_default(default: AircraftProfile) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(default.name.clone(), default.clone());
        Self { profiles, default }
    }

    /// Add or replace a profile (keyed by name).
    pub fn register(&mut self, profile: AircraftProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Profile by name. Unknown names fall back to the default with a
    /// warning so an unexpected aircraft type never blocks a session.
    pub fn get(&self, name: &str) -> &AircraftProfile {
        if let Some(profile) = self.profiles.get(name) {
            profile
        } else {
            log::warn!(
                "unknown aircraft type '{}', falling back to '{}'",
                name,
                self.default.name
            );
            &self.default
        }
    }

    pub fn default_profile(&self) -> &AircraftProfile {
        &self.default
    }

    /// Registered names, sorted for stable listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Register every profile in a JSON array (see
    /// `data/aircraft_profiles.json`). Returns how many were added.
    pub fn load_json(&mut self, json: &str) -> Result<usize, CatalogError> {
        let specs: Vec<ProfileSpec> = serde_json::from_str(json)?;
        let count = specs.len();
        for spec in specs {
            if spec.total_rows == 0 {
                return Err(CatalogError::Invalid {
                    name: spec.name,
                    reason: "total_rows must be at least 1".into(),
                });
            }
            if spec.ramp_width_m <= 0.0 || spec.ramp_length_m <= 0.0 {
                return Err(CatalogError::Invalid {
                    name: spec.name,
                    reason: "ramp dimensions must be positive".into(),
                });
            }
            self.register(AircraftProfile::new(
                spec.name,
                spec.ramp_width_m,
                spec.ramp_length_m,
                spec.total_rows,
                row_limits(&spec.row_limits_kg),
            ));
        }
        Ok(count)
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
