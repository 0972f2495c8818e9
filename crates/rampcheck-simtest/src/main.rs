//! RampCheck Headless Validation Harness
//!
//! Validates pure placement logic and bundled data without an AR runtime.
//! Runs entirely in-process - no tracking, no rendering, no UI.
//!
//! Usage:
//!   cargo run -p rampcheck-simtest
//!   cargo run -p rampcheck-simtest -- --verbose

use rampcheck_logic::convert::RampFrame;
use rampcheck_logic::evaluate::PlacementEvaluator;
use rampcheck_logic::plan::{LoadingPlan, PlanEntry};
use rampcheck_logic::plan_text::{self, SAMPLE_PLAN};
use rampcheck_logic::pose::Pose;
use rampcheck_logic::profile::ProfileCatalog;
use rampcheck_logic::slot::{Side, Slot};
use rampcheck_session::{Placement, RampSession};
use serde::Deserialize;

// ── Bundled data (same files a host app ships) ──────────────────────────
const PROFILES_JSON: &str = include_str!("../../../data/aircraft_profiles.json");
const PLAN_TEXT: &str = include_str!("../../../data/sample_loading_plan.txt");

/// Raw shape of one profile entry, checked before the catalog sees it.
#[derive(Debug, Deserialize)]
struct ProfileSpec {
    name: String,
    ramp_width_m: f32,
    ramp_length_m: f32,
    total_rows: u32,
    row_limits_kg: Vec<f32>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== RampCheck Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Aircraft profile data + catalog
    results.extend(validate_profile_data(verbose));

    // 2. Slot code round-trips
    results.extend(validate_slot_codes(verbose));

    // 3. Frame conversions across the fleet
    results.extend(validate_frame_conversions(verbose));

    // 4. Plan text parsing
    results.extend(validate_plan_parsing(verbose));

    // 5. Placement evaluation scenarios
    results.extend(validate_evaluator(verbose));

    // 6. Occupancy invariant sweep
    results.extend(validate_occupancy_sweep(verbose));

    // 7. Session flow
    results.extend(validate_session_flow(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Reference pose the way a tracker might report it: off-origin, rotated
/// 0.8 rad about +Y, quaternion passed as raw components.
fn field_reference() -> Pose {
    let half = 0.4f32;
    Pose::from_raw(-3.2, 1.4, 7.9, 0.0, half.sin(), 0.0, half.cos())
}

/// Plan used by the evaluator scenarios: AKE123 expected on 2R at 4800 kg,
/// 5000 kg limits everywhere on a four-row ramp.
fn scenario_plan() -> LoadingPlan {
    let mut plan = LoadingPlan::new();
    plan.upsert_entry(PlanEntry {
        container_id: "AKE123".into(),
        expected_weight_kg: 4800.0,
        expected_slot_code: "2R".into(),
    });
    for row in 1..=4 {
        plan.set_weight_limit(format!("{row}L"), 5000.0);
        plan.set_weight_limit(format!("{row}R"), 5000.0);
    }
    plan
}

// ── 1. Aircraft Profiles ────────────────────────────────────────────────

fn validate_profile_data(verbose: bool) -> Vec<TestResult> {
    println!("--- Aircraft Profiles ---");
    let mut results = Vec::new();

    let specs: Vec<ProfileSpec> = match serde_json::from_str(PROFILES_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "profiles_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "profiles_not_empty".into(),
        passed: !specs.is_empty(),
        detail: format!("{} aircraft in data file", specs.len()),
    });

    let bad_dims: Vec<_> = specs
        .iter()
        .filter(|s| s.ramp_width_m <= 0.0 || s.ramp_length_m <= 0.0 || s.total_rows == 0)
        .collect();
    results.push(TestResult {
        name: "profiles_positive_dimensions".into(),
        passed: bad_dims.is_empty(),
        detail: if bad_dims.is_empty() {
            "all decks have positive dimensions and rows".into()
        } else {
            format!(
                "{} bad profiles: {}",
                bad_dims.len(),
                bad_dims
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    });

    // Every row must carry a limit, or the slot silently becomes unlimited.
    let uncovered: Vec<_> = specs
        .iter()
        .filter(|s| s.row_limits_kg.len() != s.total_rows as usize)
        .collect();
    results.push(TestResult {
        name: "profiles_rows_covered".into(),
        passed: uncovered.is_empty(),
        detail: if uncovered.is_empty() {
            "every row has a weight limit".into()
        } else {
            format!("{} profiles with missing row limits", uncovered.len())
        },
    });

    let bad_limits = specs
        .iter()
        .flat_map(|s| s.row_limits_kg.iter())
        .filter(|&&kg| kg <= 0.0)
        .count();
    results.push(TestResult {
        name: "profiles_positive_limits".into(),
        passed: bad_limits == 0,
        detail: format!("{} non-positive limits", bad_limits),
    });

    // Load the same file through the catalog.
    let mut catalog = ProfileCatalog::builtin();
    let builtin_count = catalog.len();
    match catalog.load_json(PROFILES_JSON) {
        Ok(added) => results.push(TestResult {
            name: "catalog_loads_data_file".into(),
            passed: added == specs.len() && catalog.len() == builtin_count + specs.len(),
            detail: format!(
                "{} built-in + {} from JSON = {} profiles",
                builtin_count,
                added,
                catalog.len()
            ),
        }),
        Err(e) => results.push(TestResult {
            name: "catalog_loads_data_file".into(),
            passed: false,
            detail: format!("{}", e),
        }),
    }

    // Every slot of every catalogued aircraft resolves to a real limit.
    let mut slots_checked = 0u32;
    let mut missing = 0u32;
    for name in catalog.names() {
        let profile = catalog.get(name);
        for row in 1..=profile.total_rows {
            for side in [Side::Left, Side::Right] {
                slots_checked += 1;
                if profile.weight_limit(&Slot::new(row, side).code()) == f32::MAX {
                    missing += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "catalog_limit_coverage".into(),
        passed: missing == 0,
        detail: format!("{} slots checked, {} without a limit", slots_checked, missing),
    });

    let fallback = catalog.get("Concorde");
    results.push(TestResult {
        name: "catalog_unknown_falls_back".into(),
        passed: fallback.name == catalog.default_profile().name,
        detail: format!("unknown type → '{}'", fallback.name),
    });

    if verbose {
        println!("  Catalogued fleet:");
        for name in catalog.names() {
            let p = catalog.get(name);
            println!(
                "    {:12} {:>4.0} x {:<4.0} m, {:>2} rows",
                p.name, p.ramp_width_m, p.ramp_length_m, p.total_rows
            );
        }
    }

    results
}

// ── 2. Slot Codes ───────────────────────────────────────────────────────

fn validate_slot_codes(_verbose: bool) -> Vec<TestResult> {
    println!("--- Slot Codes ---");
    let mut results = Vec::new();

    // Round-trip every code the largest ramp can produce.
    let mut failures = 0;
    for row in 1..=40u32 {
        for side in [Side::Left, Side::Right] {
            let slot = Slot::new(row, side);
            if Slot::parse(&slot.code()) != Some(slot) {
                failures += 1;
            }
        }
    }
    results.push(TestResult {
        name: "slot_code_roundtrip".into(),
        passed: failures == 0,
        detail: format!("80 codes round-tripped, {} failures", failures),
    });

    let malformed = ["", "L", "7", "5X", "0R", "-1L", "2 R"];
    let rejected = malformed.iter().filter(|c| Slot::parse(c).is_none()).count();
    results.push(TestResult {
        name: "slot_code_rejects_malformed".into(),
        passed: rejected == malformed.len(),
        detail: format!("{}/{} malformed codes rejected", rejected, malformed.len()),
    });

    results.push(TestResult {
        name: "slot_code_case_insensitive".into(),
        passed: Slot::parse("2r") == Some(Slot::new(2, Side::Right))
            && Slot::parse("10l") == Some(Slot::new(10, Side::Left)),
        detail: "\"2r\" and \"10l\" parse".into(),
    });

    results.push(TestResult {
        name: "slot_from_normalized".into(),
        passed: Slot::from_normalized(0.2, 0.1, 4) == Slot::new(1, Side::Left)
            && Slot::from_normalized(0.9, 0.6, 4) == Slot::new(3, Side::Right),
        detail: "interior points land in their cells".into(),
    });

    results.push(TestResult {
        name: "slot_from_normalized_clamps".into(),
        passed: Slot::from_normalized(0.9, 1.5, 4) == Slot::new(4, Side::Right)
            && Slot::from_normalized(0.1, -0.7, 4) == Slot::new(1, Side::Left),
        detail: "nz=1.5 → row 4, nz=-0.7 → row 1".into(),
    });

    results
}

// ── 3. Ramp Frames ──────────────────────────────────────────────────────

fn validate_frame_conversions(verbose: bool) -> Vec<TestResult> {
    println!("--- Ramp Frames ---");
    let mut results = Vec::new();
    let catalog = ProfileCatalog::builtin();

    // Slot center → world → slot, for every slot of every built-in deck,
    // with the frame anchored at a rotated off-origin reference.
    let mut slots_checked = 0u32;
    let mut roundtrip_failures = 0u32;
    let mut footprint_failures = 0u32;
    for name in catalog.names() {
        let profile = catalog.get(name);
        let frame = RampFrame::for_profile(field_reference(), profile);
        for row in 1..=profile.total_rows {
            for side in [Side::Left, Side::Right] {
                let slot = Slot::new(row, side);
                let center = frame.slot_center_world(slot);
                slots_checked += 1;
                if frame.slot_at(&center) != slot {
                    roundtrip_failures += 1;
                }
                if !frame.in_footprint(&frame.to_local(&center)) {
                    footprint_failures += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "frame_center_roundtrip".into(),
        passed: roundtrip_failures == 0,
        detail: format!(
            "{} slot centers across {} aircraft, {} failures",
            slots_checked,
            catalog.len(),
            roundtrip_failures
        ),
    });
    results.push(TestResult {
        name: "frame_centers_in_footprint".into(),
        passed: footprint_failures == 0,
        detail: format!("{} centers off the deck", footprint_failures),
    });

    // Behind the reference edge: off the deck, but still clamps to row 1.
    let profile = catalog.default_profile();
    let frame = RampFrame::for_profile(field_reference(), profile);
    let behind = frame
        .reference()
        .compose(&Pose::from_translation(2.0, 0.0, 1.5));
    let local = frame.to_local(&behind);
    let clamped = frame.slot_at(&behind);
    results.push(TestResult {
        name: "frame_flags_off_deck".into(),
        passed: !frame.in_footprint(&local) && clamped.row == 1,
        detail: format!("local z={:.1} rejected, clamps to row {}", local.z, clamped.row),
    });

    // Normalized coordinates reach (1, 1) at the far corner.
    let far = frame.reference().compose(&Pose::from_translation(
        profile.ramp_width_m,
        0.0,
        -profile.ramp_length_m,
    ));
    let (nx, nz) = frame.normalize(&frame.to_local(&far));
    results.push(TestResult {
        name: "frame_normalize_far_corner".into(),
        passed: (nx - 1.0).abs() < 1e-4 && (nz - 1.0).abs() < 1e-4,
        detail: format!("far corner → ({:.3}, {:.3})", nx, nz),
    });

    if verbose {
        println!("  Cell sizes by aircraft:");
        for name in catalog.names() {
            let p = catalog.get(name);
            let f = RampFrame::for_profile(Pose::identity(), p);
            println!(
                "    {:12} cell {:.1} x {:.1} m",
                p.name,
                f.cell_width_m(),
                f.cell_height_m()
            );
        }
    }

    results
}

// ── 4. Plan Parsing ─────────────────────────────────────────────────────

fn validate_plan_parsing(_verbose: bool) -> Vec<TestResult> {
    println!("--- Plan Parsing ---");
    let mut results = Vec::new();

    let from_file = plan_text::parse_str(PLAN_TEXT);
    results.push(TestResult {
        name: "plan_file_parses".into(),
        passed: from_file.entry_count() == 4,
        detail: format!(
            "{} entries from data/sample_loading_plan.txt",
            from_file.entry_count()
        ),
    });

    // The built-in sample and the bundled file must stay in sync.
    let builtin = plan_text::parse_str(SAMPLE_PLAN);
    let in_sync = builtin.entry_count() == from_file.entry_count()
        && builtin
            .entries()
            .all(|e| from_file.entry(&e.container_id) == Some(e));
    results.push(TestResult {
        name: "plan_sample_in_sync".into(),
        passed: in_sync,
        detail: "SAMPLE_PLAN matches the bundled file".into(),
    });

    // Malformed lines skip without aborting the rest of the file.
    let partial = plan_text::parse_str(
        "ContainerID=AKE456, Weight=3000, Position=1L\n# comment\n\nContainerID=BAD\n",
    );
    results.push(TestResult {
        name: "plan_skips_malformed_lines".into(),
        passed: partial.entry_count() == 1 && partial.entry("AKE456").is_some(),
        detail: format!("{} of 2 data lines kept", partial.entry_count()),
    });

    let dup = plan_text::parse_str(
        "ContainerID=AKE1, Weight=1000, Position=1L\nContainerID=AKE1, Weight=2000, Position=3R\n",
    );
    results.push(TestResult {
        name: "plan_duplicate_last_wins".into(),
        passed: dup.entry_count() == 1
            && dup.entry("AKE1").map(|e| e.expected_slot_code.as_str()) == Some("3R"),
        detail: "duplicate container keeps the later line".into(),
    });

    let from_reader = plan_text::parse_reader(PLAN_TEXT.as_bytes());
    results.push(TestResult {
        name: "plan_reader_entry_point".into(),
        passed: from_reader.map(|p| p.entry_count() == 4).unwrap_or(false),
        detail: "reader parse matches string parse".into(),
    });

    results
}

// ── 5. Placement Evaluation ─────────────────────────────────────────────

fn validate_evaluator(_verbose: bool) -> Vec<TestResult> {
    println!("--- Placement Evaluation ---");
    let mut results = Vec::new();

    // Planned slot, weight under the limit.
    let mut eval = PlacementEvaluator::new(scenario_plan(), 4);
    let ok = eval.evaluate("AKE123", 4800.0, Slot::new(2, Side::Right));
    results.push(TestResult {
        name: "eval_planned_placement_passes".into(),
        passed: ok.position_matches && ok.weight_ok && ok.overall_ok && ok.suggested.is_none(),
        detail: format!("AKE123 on 2R: overall_ok={}", ok.overall_ok),
    });

    // Same event twice: verdict and occupancy unchanged.
    let again = eval.evaluate("AKE123", 4800.0, Slot::new(2, Side::Right));
    results.push(TestResult {
        name: "eval_reevaluation_idempotent".into(),
        passed: again == ok && eval.occupied_count() == 1,
        detail: "second evaluation matches the first".into(),
    });

    // Wrong slot: fails position, suggests the nearest free slot.
    let mut eval = PlacementEvaluator::new(scenario_plan(), 4);
    let wrong = eval.evaluate("AKE123", 4800.0, Slot::new(1, Side::Left));
    results.push(TestResult {
        name: "eval_wrong_slot_suggests".into(),
        passed: !wrong.position_matches
            && wrong.weight_ok
            && !wrong.overall_ok
            && wrong.expected == Some(Slot::new(2, Side::Right))
            && wrong.suggested == Some(Slot::new(1, Side::Right)),
        detail: format!(
            "expected 2R, suggested {}",
            wrong.suggested.map(|s| s.code()).unwrap_or_else(|| "none".into())
        ),
    });

    // Second container on the same slot evicts the first.
    let mut eval = PlacementEvaluator::new(scenario_plan(), 4);
    eval.evaluate("FIRST", 1000.0, Slot::new(2, Side::Right));
    eval.evaluate("SECOND", 1000.0, Slot::new(2, Side::Right));
    results.push(TestResult {
        name: "eval_same_slot_evicts".into(),
        passed: eval.occupant_of(Slot::new(2, Side::Right)) == Some("SECOND")
            && eval.slot_of("FIRST").is_none()
            && eval.occupied_count() == 1,
        detail: "second container displaces the first".into(),
    });

    // Unconfigured slot codes never fail the weight check.
    let mut eval = PlacementEvaluator::new(LoadingPlan::new(), 4);
    let heavy = eval.evaluate("HEAVY", 1.0e9, Slot::new(3, Side::Left));
    results.push(TestResult {
        name: "eval_weight_sentinel".into(),
        passed: heavy.weight_ok,
        detail: "1e9 kg passes on an unlimited slot".into(),
    });

    // A full ramp yields no suggestion (absent, not an error).
    let mut eval = PlacementEvaluator::new(scenario_plan(), 2);
    for code in ["1L", "1R", "2L"] {
        eval.evaluate(&format!("FILL-{code}"), 1000.0, Slot::parse(code).expect("valid code"));
    }
    let jammed = eval.evaluate("LATE", 1000.0, Slot::new(2, Side::Right));
    results.push(TestResult {
        name: "eval_full_ramp_no_suggestion".into(),
        passed: !jammed.overall_ok && jammed.suggested.is_none(),
        detail: "all slots taken → no suggestion".into(),
    });

    results
}

// ── 6. Occupancy Invariant ──────────────────────────────────────────────

fn validate_occupancy_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Occupancy Invariant ---");
    let mut results = Vec::new();

    let mut eval = PlacementEvaluator::new(LoadingPlan::new(), 4);
    let moves = [
        ("A", "1L"),
        ("B", "1R"),
        ("C", "2L"),
        ("A", "3R"),
        ("B", "3R"),
        ("C", "1L"),
        ("A", "1L"),
        ("A", "4R"),
    ];

    // After every move the forward and reverse lookups must agree.
    let mut consistent = true;
    for (id, code) in moves {
        eval.evaluate(id, 100.0, Slot::parse(code).expect("valid code"));

        let mut seen = 0;
        for row in 1..=4 {
            for side in [Side::Left, Side::Right] {
                let slot = Slot::new(row, side);
                if let Some(occupant) = eval.occupant_of(slot) {
                    seen += 1;
                    if eval.slot_of(occupant) != Some(slot) {
                        consistent = false;
                    }
                }
            }
        }
        if seen != eval.occupied_count() {
            consistent = false;
        }
        for container in ["A", "B", "C"] {
            if let Some(slot) = eval.slot_of(container) {
                if eval.occupant_of(slot) != Some(container) {
                    consistent = false;
                }
            }
        }
    }
    results.push(TestResult {
        name: "occupancy_one_to_one".into(),
        passed: consistent,
        detail: format!("{} moves, maps agree after each", moves.len()),
    });

    results.push(TestResult {
        name: "occupancy_final_state".into(),
        passed: eval.slot_of("A") == Some(Slot::new(4, Side::Right))
            && eval.slot_of("B") == Some(Slot::new(3, Side::Right))
            && eval.slot_of("C").is_none()
            && eval.occupied_count() == 2,
        detail: "A on 4R, B on 3R, C displaced".into(),
    });

    if verbose {
        println!("  Final occupancy:");
        for row in 1..=4 {
            for side in [Side::Left, Side::Right] {
                let slot = Slot::new(row, side);
                if let Some(occupant) = eval.occupant_of(slot) {
                    println!("    {}: {}", slot.code(), occupant);
                }
            }
        }
    }

    results
}

// ── 7. Ramp Session ─────────────────────────────────────────────────────

fn validate_session_flow(verbose: bool) -> Vec<TestResult> {
    println!("--- Ramp Session ---");
    let mut results = Vec::new();
    let catalog = ProfileCatalog::builtin();
    let profile = catalog.get("Boeing 737").clone();

    // Guided walk: the first event anchors the frame, then every slot in
    // order. Placement poses are slot centers of the same frame the anchor
    // establishes (identity reference).
    let session = RampSession::with_guided_demo(profile.clone(), LoadingPlan::new());
    let first = session.place_next(&Pose::identity());
    let anchored = match &first {
        Some(Placement::Anchored { evaluation }) => evaluation.overall_ok,
        _ => false,
    };
    results.push(TestResult {
        name: "session_first_event_anchors".into(),
        passed: anchored && session.frame_established(),
        detail: "first placement set the ramp origin and passed".into(),
    });

    let frame = RampFrame::for_profile(Pose::identity(), &profile);
    let mut all_ok = anchored;
    for _ in 1..profile.total_rows * 2 {
        let target = session.current_target().expect("guided session has targets");
        let slot = Slot::parse(&target.slot_code).expect("demo codes are valid");
        let placement = session
            .place_next(&frame.slot_center_world(slot))
            .expect("guided session has targets");
        all_ok &= placement.evaluation().map(|e| e.overall_ok).unwrap_or(false);
    }
    results.push(TestResult {
        name: "session_guided_walk_passes".into(),
        passed: all_ok,
        detail: format!("{} scripted placements all pass", profile.total_rows * 2),
    });

    let grid = session.grid();
    results.push(TestResult {
        name: "session_grid_complete".into(),
        passed: grid.len() == (profile.total_rows * 2) as usize
            && grid.iter().all(|c| c.container_id.is_some() && c.placement_ok),
        detail: format!("{} cells occupied and correct", grid.len()),
    });

    results.push(TestResult {
        name: "session_rotation_wraps".into(),
        passed: session.current_target().map(|t| t.container_id) == Some("ULD-1L".into()),
        detail: "target rotation back at ULD-1L".into(),
    });

    // Off-deck event: rejected, target not consumed.
    let off_deck = frame
        .reference()
        .compose(&Pose::from_translation(-2.0, 0.0, 3.0));
    let rejected = session.place_next(&off_deck);
    results.push(TestResult {
        name: "session_rejects_off_deck".into(),
        passed: matches!(rejected, Some(Placement::OutOfBounds { .. }))
            && session.current_target().map(|t| t.container_id) == Some("ULD-1L".into()),
        detail: "out-of-bounds pose ignored, rotation held".into(),
    });

    if verbose {
        println!("  Final demo grid:");
        for cell in &grid {
            println!(
                "    {}: {} ({})",
                cell.slot.code(),
                cell.container_id.as_deref().unwrap_or("-"),
                if cell.placement_ok { "ok" } else { "misplaced" }
            );
        }
    }

    // Misplaced container: the suggestion marker lands on the suggested slot.
    let mut plan = LoadingPlan::new();
    plan.upsert_entry(PlanEntry {
        container_id: "AKE1".into(),
        expected_weight_kg: 800.0,
        expected_slot_code: "2R".into(),
    });
    let session = RampSession::new(profile.clone(), plan);
    let placement = session.place("AKE1", 800.0, &Pose::identity());
    let suggested = placement.evaluation().and_then(|e| e.suggested);
    let marker_ok = match (suggested, session.suggestion_anchor()) {
        (Some(slot), Some(anchor)) => frame.slot_at(&anchor) == slot,
        _ => false,
    };
    results.push(TestResult {
        name: "session_suggestion_marker".into(),
        passed: marker_ok,
        detail: format!(
            "misplaced AKE1 → marker on {}",
            suggested.map(|s| s.code()).unwrap_or_else(|| "none".into())
        ),
    });

    // Following the suggestion to the planned slot clears the marker.
    let correction = session.place(
        "AKE1",
        800.0,
        &frame.slot_center_world(Slot::new(2, Side::Right)),
    );
    results.push(TestResult {
        name: "session_correction_clears_marker".into(),
        passed: correction.evaluation().map(|e| e.overall_ok).unwrap_or(false)
            && session.suggestion_anchor().is_none(),
        detail: "correct follow-up placement passes, marker gone".into(),
    });

    results
}
