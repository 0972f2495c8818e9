//! Stateful ramp session: one aircraft, one plan, one coarse lock.
//!
//! The session owns everything mutable for a live ramp check and funnels
//! every event through [`RampSession::place`]. The host layers (tracking,
//! overlay rendering, UI) stay thin: they hand in world poses and read
//! back snapshots. All state sits behind a single internal mutex, so a
//! session can be shared across the tracking and render threads as-is.
//!
//! Session flow:
//! 1. The first placement event anchors the ramp frame at the event pose
//!    and is then evaluated like any other event (it lands on row 1 left
//!    by construction).
//! 2. Later events convert to a slot, get evaluated, and update the grid
//!    cells and the suggestion anchor.
//! 3. Events outside the deck footprint are rejected before evaluation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use rampcheck_logic::convert::RampFrame;
use rampcheck_logic::evaluate::{Evaluation, PlacementEvaluator};
use rampcheck_logic::plan::{LoadingPlan, PlanEntry};
use rampcheck_logic::pose::Pose;
use rampcheck_logic::profile::AircraftProfile;
use rampcheck_logic::slot::{Side, Slot};

/// One scripted demo placement: container, weight, target slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoTarget {
    pub container_id: String,
    pub weight_kg: f32,
    pub slot_code: String,
}

/// Snapshot of one grid cell for overlay rendering.
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub slot: Slot,
    /// World pose of the cell center, for anchoring the overlay.
    pub center_world: Pose,
    pub container_id: Option<String>,
    /// Verdict of the occupant's last evaluation.
    pub placement_ok: bool,
}

/// Result of one placement event.
#[derive(Debug, Clone, Serialize)]
pub enum Placement {
    /// First event: the pose became the ramp origin, then was evaluated.
    Anchored { evaluation: Evaluation },
    /// The pose landed outside the deck footprint; nothing was evaluated.
    OutOfBounds { local_x: f32, local_z: f32 },
    /// Normal evaluation against the established frame.
    Evaluated { evaluation: Evaluation },
}

impl Placement {
    /// The evaluation, when the event produced one.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            Placement::Anchored { evaluation } | Placement::Evaluated { evaluation } => {
                Some(evaluation)
            }
            Placement::OutOfBounds { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct CellState {
    container_id: Option<String>,
    placement_ok: bool,
}

#[derive(Debug)]
struct SessionState {
    profile: AircraftProfile,
    frame: Option<RampFrame>,
    evaluator: PlacementEvaluator,
    cells: HashMap<Slot, CellState>,
    demo_targets: Vec<DemoTarget>,
    demo_index: usize,
    suggestion_anchor: Option<Pose>,
}

/// A live ramp-check session. Shareable across threads; every operation
/// takes the internal lock once.
#[derive(Debug)]
pub struct RampSession {
    inner: Mutex<SessionState>,
}

impl RampSession {
    /// Session over a profile and plan. The profile's weight limits
    /// replace whatever the plan carried.
    pub fn new(profile: AircraftProfile, mut plan: LoadingPlan) -> Self {
        plan.apply_profile_limits(&profile);
        let evaluator = PlacementEvaluator::new(plan, profile.total_rows);
        Self {
            inner: Mutex::new(SessionState {
                profile,
                frame: None,
                evaluator,
                cells: HashMap::new(),
                demo_targets: Vec::new(),
                demo_index: 0,
                suggestion_anchor: None,
            }),
        }
    }

    /// Session with the built-in fallback plan.
    pub fn with_demo_plan(profile: AircraftProfile) -> Self {
        Self::new(profile, LoadingPlan::demo_plan())
    }

    /// Guided session: one scripted `ULD-<code>` container per slot is
    /// appended to the plan, each weighed to pass its slot's limit, and
    /// [`RampSession::place_next`] walks through them in slot order.
    pub fn with_guided_demo(profile: AircraftProfile, mut plan: LoadingPlan) -> Self {
        plan.apply_profile_limits(&profile);
        let demo_targets = seed_demo_targets(&profile, &mut plan);
        let evaluator = PlacementEvaluator::new(plan, profile.total_rows);
        Self {
            inner: Mutex::new(SessionState {
                profile,
                frame: None,
                evaluator,
                cells: HashMap::new(),
                demo_targets,
                demo_index: 0,
                suggestion_anchor: None,
            }),
        }
    }

    /// Handle one placement event for a known container.
    pub fn place(&self, container_id: &str, weight_kg: f32, world: &Pose) -> Placement {
        let mut state = self.state();
        Self::place_locked(&mut state, container_id, weight_kg, world)
    }

    /// Place the current demo target at a pose and advance the rotation.
    /// `None` when the session has no demo targets.
    pub fn place_next(&self, world: &Pose) -> Option<Placement> {
        let mut state = self.state();
        let target = state.demo_targets.get(state.demo_index).cloned()?;
        let placement =
            Self::place_locked(&mut state, &target.container_id, target.weight_kg, world);
        if !matches!(placement, Placement::OutOfBounds { .. }) {
            state.demo_index = (state.demo_index + 1) % state.demo_targets.len();
        }
        Some(placement)
    }

    /// The demo target the next [`RampSession::place_next`] will use.
    pub fn current_target(&self) -> Option<DemoTarget> {
        let state = self.state();
        state.demo_targets.get(state.demo_index).cloned()
    }

    /// Grid snapshot for rendering, in row order with Left before Right.
    /// Empty until the frame is anchored.
    pub fn grid(&self) -> Vec<GridCell> {
        let state = self.state();
        let frame = match state.frame {
            Some(frame) => frame,
            None => return Vec::new(),
        };
        let mut cells = Vec::with_capacity(state.profile.total_rows as usize * 2);
        for row in 1..=state.profile.total_rows {
            for side in [Side::Left, Side::Right] {
                let slot = Slot::new(row, side);
                let cell = state.cells.get(&slot);
                cells.push(GridCell {
                    slot,
                    center_world: frame.slot_center_world(slot),
                    container_id: cell.and_then(|c| c.container_id.clone()),
                    placement_ok: cell.map_or(false, |c| c.placement_ok),
                });
            }
        }
        cells
    }

    /// World pose for the latest suggestion marker, if the last evaluation
    /// produced one.
    pub fn suggestion_anchor(&self) -> Option<Pose> {
        self.state().suggestion_anchor
    }

    pub fn frame_established(&self) -> bool {
        self.state().frame.is_some()
    }

    pub fn profile_name(&self) -> String {
        self.state().profile.name.clone()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().expect("ramp session lock poisoned")
    }

    fn place_locked(
        state: &mut SessionState,
        container_id: &str,
        weight_kg: f32,
        world: &Pose,
    ) -> Placement {
        let (frame, anchored_now) = match state.frame {
            Some(frame) => (frame, false),
            None => {
                let frame = RampFrame::for_profile(*world, &state.profile);
                log::info!(
                    "ramp frame anchored for '{}': {} rows, {:.1} x {:.1} m",
                    state.profile.name,
                    state.profile.total_rows,
                    state.profile.ramp_width_m,
                    state.profile.ramp_length_m
                );
                state.frame = Some(frame);
                state.cells.clear();
                (frame, true)
            }
        };

        let local = frame.to_local(world);
        if !frame.in_footprint(&local) {
            log::warn!(
                "'{}' placed off the deck (local x={:.2} z={:.2}), ignoring",
                container_id,
                local.x,
                local.z
            );
            return Placement::OutOfBounds {
                local_x: local.x,
                local_z: local.z,
            };
        }

        let slot = frame.slot_at_local(&local);
        let (nx, nz) = frame.normalize(&local);
        log::debug!(
            "'{}' local ({:.2}, {:.2}, {:.2}) normalized ({:.2}, {:.2}) -> slot {}",
            container_id,
            local.x,
            local.y,
            local.z,
            nx,
            nz,
            slot
        );

        let evaluation = state.evaluator.evaluate(container_id, weight_kg, slot);
        if !evaluation.overall_ok {
            log::info!(
                "'{}' at {} rejected: position_matches={} weight_ok={} suggested={:?}",
                container_id,
                slot,
                evaluation.position_matches,
                evaluation.weight_ok,
                evaluation.suggested.map(|s| s.code())
            );
        }

        Self::apply_to_cells(&mut state.cells, container_id, &evaluation);
        state.suggestion_anchor = evaluation
            .suggested
            .map(|suggested| frame.slot_center_world(suggested));

        if anchored_now {
            Placement::Anchored { evaluation }
        } else {
            Placement::Evaluated { evaluation }
        }
    }

    /// Mirror an evaluation into the cell table: free any cell the
    /// container held, then mark its new cell.
    fn apply_to_cells(
        cells: &mut HashMap<Slot, CellState>,
        container_id: &str,
        evaluation: &Evaluation,
    ) {
        for cell in cells.values_mut() {
            if cell.container_id.as_deref() == Some(container_id) {
                cell.container_id = None;
                cell.placement_ok = false;
            }
        }
        let cell = cells.entry(evaluation.actual).or_default();
        cell.container_id = Some(container_id.to_string());
        cell.placement_ok = evaluation.overall_ok;
    }
}

/// One demo container per slot, row by row with Left before Right.
fn seed_demo_targets(profile: &AircraftProfile, plan: &mut LoadingPlan) -> Vec<DemoTarget> {
    let mut targets = Vec::with_capacity(profile.total_rows as usize * 2);
    for row in 1..=profile.total_rows {
        for side in [Side::Left, Side::Right] {
            let code = Slot::new(row, side).code();
            let target = DemoTarget {
                container_id: format!("ULD-{code}"),
                weight_kg: profile.demo_weight_for(&code),
                slot_code: code,
            };
            plan.upsert_entry(PlanEntry {
                container_id: target.container_id.clone(),
                expected_weight_kg: target.weight_kg,
                expected_slot_code: target.slot_code.clone(),
            });
            targets.push(target);
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampcheck_logic::profile::ProfileCatalog;
    use std::sync::Arc;
    use std::thread;

    fn aircraft_a() -> AircraftProfile {
        ProfileCatalog::builtin().get("Aircraft A").clone()
    }

    /// Plan with weights that fit Aircraft A's 1000 kg slot limits.
    fn light_plan() -> LoadingPlan {
        let mut plan = LoadingPlan::new();
        for (id, weight, code) in [("AKE1", 800.0, "1L"), ("AKE2", 900.0, "2R")] {
            plan.upsert_entry(PlanEntry {
                container_id: id.into(),
                expected_weight_kg: weight,
                expected_slot_code: code.into(),
            });
        }
        plan
    }

    fn light_session() -> RampSession {
        RampSession::new(aircraft_a(), light_plan())
    }

    /// World pose hovering over a slot center, relative to a reference.
    fn pose_for(reference: &Pose, profile: &AircraftProfile, code: &str) -> Pose {
        let frame = RampFrame::for_profile(*reference, profile);
        frame.slot_center_world(Slot::parse(code).unwrap())
    }

    // --- Anchoring ---

    #[test]
    fn first_event_anchors_and_evaluates() {
        let session = light_session();
        assert!(!session.frame_established());

        let placement = session.place("AKE1", 800.0, &Pose::from_translation(4.0, 0.9, -2.0));
        match placement {
            Placement::Anchored { evaluation } => {
                // The anchor pose is the ramp origin, so it lands on 1L,
                // exactly where AKE1 belongs.
                assert_eq!(evaluation.actual, Slot::new(1, Side::Left));
                assert!(evaluation.overall_ok);
            }
            other => panic!("expected Anchored, got {other:?}"),
        }
        assert!(session.frame_established());
        assert_eq!(session.grid().len(), 8);
    }

    #[test]
    fn second_event_evaluates_against_the_anchor() {
        let profile = aircraft_a();
        let session = light_session();

        let reference = Pose::from_translation(1.0, 0.0, 2.0);
        session.place("AKE1", 800.0, &reference);

        let world = pose_for(&reference, &profile, "2R");
        let placement = session.place("AKE2", 900.0, &world);
        let evaluation = placement.evaluation().expect("in-bounds event");
        assert_eq!(evaluation.actual, Slot::new(2, Side::Right));
        assert!(evaluation.overall_ok);
        assert!(matches!(placement, Placement::Evaluated { .. }));
    }

    #[test]
    fn profile_limits_govern_the_plan() {
        // The fallback plan carries 5000 kg limits, but the session
        // applies the aircraft's own table (1000 kg on Aircraft A), so a
        // 3000 kg container fails weight everywhere.
        let session = RampSession::with_demo_plan(aircraft_a());
        let placement = session.place("AKE456", 3000.0, &Pose::identity());
        let evaluation = placement.evaluation().unwrap();
        assert!(evaluation.position_matches);
        assert!(!evaluation.weight_ok);
        assert_eq!(evaluation.suggested, None);
    }

    // --- Bounds ---

    #[test]
    fn off_deck_event_is_rejected_not_evaluated() {
        let session = light_session();

        let reference = Pose::identity();
        session.place("AKE1", 800.0, &reference);

        // Three meters behind the reference edge.
        let world = Pose::from_translation(2.0, 0.0, 3.0);
        let placement = session.place("AKE2", 900.0, &world);
        match placement {
            Placement::OutOfBounds { local_z, .. } => {
                assert!((local_z - 3.0).abs() < 1e-5);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        // The rejected container never entered the grid.
        let grid = session.grid();
        assert!(grid
            .iter()
            .all(|c| c.container_id.as_deref() != Some("AKE2")));
    }

    // --- Grid state ---

    #[test]
    fn grid_tracks_moves_and_verdicts() {
        let profile = aircraft_a();
        let session = light_session();
        let reference = Pose::identity();
        session.place("AKE1", 800.0, &reference);

        // Wrong slot for AKE2 first, then the planned one.
        session.place("AKE2", 900.0, &pose_for(&reference, &profile, "3L"));
        let grid = session.grid();
        let cell_3l = grid.iter().find(|c| c.slot == Slot::new(3, Side::Left)).unwrap();
        assert_eq!(cell_3l.container_id.as_deref(), Some("AKE2"));
        assert!(!cell_3l.placement_ok);

        session.place("AKE2", 900.0, &pose_for(&reference, &profile, "2R"));
        let grid = session.grid();
        let cell_3l = grid.iter().find(|c| c.slot == Slot::new(3, Side::Left)).unwrap();
        let cell_2r = grid.iter().find(|c| c.slot == Slot::new(2, Side::Right)).unwrap();
        assert_eq!(cell_3l.container_id, None);
        assert_eq!(cell_2r.container_id.as_deref(), Some("AKE2"));
        assert!(cell_2r.placement_ok);
    }

    #[test]
    fn suggestion_anchor_follows_the_last_evaluation() {
        let profile = aircraft_a();
        let session = light_session();
        let reference = Pose::identity();
        session.place("AKE1", 800.0, &reference);
        assert_eq!(session.suggestion_anchor(), None);

        // Misplace AKE2; a suggestion marker appears on the deck.
        let placement = session.place("AKE2", 900.0, &pose_for(&reference, &profile, "4R"));
        let suggested = placement.evaluation().unwrap().suggested.unwrap();
        let anchor = session.suggestion_anchor().expect("marker pose");
        let frame = RampFrame::for_profile(reference, &profile);
        assert_eq!(frame.slot_at(&anchor), suggested);

        // A correct follow-up clears the marker.
        session.place("AKE2", 900.0, &pose_for(&reference, &profile, "2R"));
        assert_eq!(session.suggestion_anchor(), None);
    }

    // --- Guided demo ---

    #[test]
    fn guided_session_walks_all_slots() {
        let profile = aircraft_a();
        let session = RampSession::with_guided_demo(profile.clone(), LoadingPlan::new());
        let reference = Pose::identity();

        let first = session.current_target().unwrap();
        assert_eq!(first.container_id, "ULD-1L");

        // Place every target on its own slot; all pass.
        for _ in 0..profile.total_rows * 2 {
            let target = session.current_target().unwrap();
            let world = pose_for(&reference, &profile, &target.slot_code);
            let placement = session.place_next(&world).unwrap();
            let evaluation = placement.evaluation().expect("in-bounds");
            assert!(evaluation.overall_ok, "target {}", target.container_id);
        }

        // The rotation wraps around.
        assert_eq!(session.current_target().unwrap().container_id, "ULD-1L");
        let grid = session.grid();
        assert!(grid.iter().all(|c| c.container_id.is_some() && c.placement_ok));
    }

    #[test]
    fn guided_rotation_holds_on_out_of_bounds() {
        let profile = aircraft_a();
        let session = RampSession::with_guided_demo(profile.clone(), LoadingPlan::new());
        session.place("ULD-1L", 900.0, &Pose::identity());

        let off_deck = Pose::from_translation(-5.0, 0.0, 4.0);
        let placement = session.place_next(&off_deck).unwrap();
        assert!(matches!(placement, Placement::OutOfBounds { .. }));
        // Target not consumed.
        assert_eq!(session.current_target().unwrap().container_id, "ULD-1L");
    }

    #[test]
    fn plain_session_has_no_targets() {
        let session = RampSession::with_demo_plan(aircraft_a());
        assert_eq!(session.current_target(), None);
        assert!(session.place_next(&Pose::identity()).is_none());
    }

    // --- Cross-thread sharing ---

    #[test]
    fn threads_share_one_session() {
        let profile = aircraft_a();
        let session = Arc::new(RampSession::with_demo_plan(profile.clone()));
        let reference = Pose::identity();
        session.place("AKE456", 3000.0, &reference);

        let mut handles = Vec::new();
        for i in 0..4 {
            let session = Arc::clone(&session);
            let profile = profile.clone();
            handles.push(thread::spawn(move || {
                let code = format!("{}R", i + 1);
                let world = pose_for(&reference, &profile, &code);
                session.place(&format!("THR-{i}"), 500.0, &world);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let occupied = session
            .grid()
            .iter()
            .filter(|c| c.container_id.is_some())
            .count();
        // AKE456 on 1L plus the four thread containers.
        assert_eq!(occupied, 5);
    }
}
