//! Ramp frame: world poses in, discrete slots out.
//!
//! The frame is pinned at the ramp's top-left corner. Local X increases
//! toward the right edge, local Y is up off the deck, and the deck extends
//! along negative Z, so a point two rows in has local z around
//! `-2 * cell_height`.
//!
//! Per placement event:
//! 1. Express the world pose in ramp-local coordinates (inverse compose).
//! 2. Reject with [`RampFrame::in_footprint`] if the caller wants bounds.
//! 3. Derive the slot: side from local X against the column split, row
//!    from floored `-z` over the row pitch, clamped into `[1, rows]`.

use nalgebra::Point3;

use crate::pose::Pose;
use crate::profile::AircraftProfile;
use crate::slot::{Side, Slot};

/// Coordinate frame of one physical ramp: reference pose plus deck layout.
#[derive(Debug, Clone, Copy)]
pub struct RampFrame {
    reference: Pose,
    width_m: f32,
    length_m: f32,
    total_rows: u32,
    cell_width_m: f32,
    cell_height_m: f32,
}

impl RampFrame {
    /// # Panics
    /// If `total_rows` is zero or a dimension is not positive.
    pub fn new(reference: Pose, width_m: f32, length_m: f32, total_rows: u32) -> Self {
        assert!(total_rows > 0, "ramp must have at least one row");
        assert!(
            width_m > 0.0 && length_m > 0.0,
            "ramp dimensions must be positive"
        );
        Self {
            reference,
            width_m,
            length_m,
            total_rows,
            cell_width_m: width_m / 2.0,
            cell_height_m: length_m / total_rows as f32,
        }
    }

    /// Frame sized from an aircraft profile.
    pub fn for_profile(reference: Pose, profile: &AircraftProfile) -> Self {
        Self::new(
            reference,
            profile.ramp_width_m,
            profile.ramp_length_m,
            profile.total_rows,
        )
    }

    pub fn reference(&self) -> &Pose {
        &self.reference
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    /// Width of one column (half the ramp).
    pub fn cell_width_m(&self) -> f32 {
        self.cell_width_m
    }

    /// Depth of one row.
    pub fn cell_height_m(&self) -> f32 {
        self.cell_height_m
    }

    /// Express a world pose as a ramp-local point.
    pub fn to_local(&self, world: &Pose) -> Point3<f32> {
        let relative = self.reference.inverse().compose(world);
        Point3::from(relative.translation())
    }

    /// Normalized deck coordinates of a local point: X across the width,
    /// depth down the length, both in 0..1 while the point is on the deck.
    pub fn normalize(&self, local: &Point3<f32>) -> (f32, f32) {
        (local.x / self.width_m, -local.z / self.length_m)
    }

    /// Whether a local point lies over the deck footprint. Height above
    /// the deck is ignored.
    pub fn in_footprint(&self, local: &Point3<f32>) -> bool {
        (0.0..=self.width_m).contains(&local.x) && (-self.length_m..=0.0).contains(&local.z)
    }

    /// Slot under a world pose. Total: rows clamp into range and every X
    /// gets a side, so call [`RampFrame::in_footprint`] first when
    /// out-of-bounds poses should be rejected instead.
    pub fn slot_at(&self, world: &Pose) -> Slot {
        self.slot_at_local(&self.to_local(world))
    }

    /// Slot under an already-converted local point.
    pub fn slot_at_local(&self, local: &Point3<f32>) -> Slot {
        let side = if local.x < self.cell_width_m {
            Side::Left
        } else {
            Side::Right
        };
        let idx = (-local.z / self.cell_height_m)
            .floor()
            .clamp(0.0, (self.total_rows - 1) as f32);
        Slot::new(idx as u32 + 1, side)
    }

    /// World pose of a slot's center on the deck plane, oriented like the
    /// ramp itself. Used to anchor overlays and suggestion markers.
    pub fn slot_center_world(&self, slot: Slot) -> Pose {
        let x = match slot.side {
            Side::Left => self.cell_width_m / 2.0,
            Side::Right => self.cell_width_m * 1.5,
        };
        let z = -((slot.row as f32 - 0.5) * self.cell_height_m);
        self.reference.compose(&Pose::from_translation(x, 0.0, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f32::consts::FRAC_PI_2;

    // Aircraft A deck: 8 m wide, 20 m long, 4 rows (4 m columns, 5 m rows).
    fn frame_at_origin() -> RampFrame {
        RampFrame::new(Pose::identity(), 8.0, 20.0, 4)
    }

    fn rotated_frame() -> RampFrame {
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let reference = Pose::from_parts(Vector3::new(10.0, 0.0, 5.0), rot);
        RampFrame::new(reference, 8.0, 20.0, 4)
    }

    // --- Local conversion ---

    #[test]
    fn identity_reference_local_equals_world() {
        let frame = frame_at_origin();
        let local = frame.to_local(&Pose::from_translation(3.0, 0.5, -7.0));
        assert!((local.x - 3.0).abs() < 1e-5);
        assert!((local.y - 0.5).abs() < 1e-5);
        assert!((local.z + 7.0).abs() < 1e-5);
    }

    #[test]
    fn rotated_reference_recovers_local_offset() {
        let frame = rotated_frame();
        // Build the world pose by composing a known local offset.
        let world = frame
            .reference()
            .compose(&Pose::from_translation(2.0, 0.0, -3.0));
        let local = frame.to_local(&world);
        assert!((local.x - 2.0).abs() < 1e-4, "x={}", local.x);
        assert!((local.z + 3.0).abs() < 1e-4, "z={}", local.z);
    }

    // --- Slot derivation ---

    #[test]
    fn slot_sides_split_at_center() {
        let frame = frame_at_origin();
        let left = frame.slot_at(&Pose::from_translation(1.9, 0.0, -2.0));
        let right = frame.slot_at(&Pose::from_translation(4.0, 0.0, -2.0));
        assert_eq!(left, Slot::new(1, Side::Left));
        // x exactly at the column split counts as Right.
        assert_eq!(right, Slot::new(1, Side::Right));
    }

    #[test]
    fn slot_rows_advance_down_the_deck() {
        let frame = frame_at_origin();
        for (z, row) in [(-0.1, 1), (-5.1, 2), (-12.0, 3), (-19.9, 4)] {
            let slot = frame.slot_at(&Pose::from_translation(1.0, 0.0, z));
            assert_eq!(slot.row, row, "z={z}");
        }
    }

    #[test]
    fn slot_rows_clamp_outside_the_deck() {
        let frame = frame_at_origin();
        // Past the far edge.
        assert_eq!(frame.slot_at(&Pose::from_translation(1.0, 0.0, -50.0)).row, 4);
        // Behind the reference edge.
        assert_eq!(frame.slot_at(&Pose::from_translation(1.0, 0.0, 3.0)).row, 1);
    }

    #[test]
    fn footprint_bounds() {
        let frame = frame_at_origin();
        assert!(frame.in_footprint(&Point3::new(0.0, 0.0, 0.0)));
        assert!(frame.in_footprint(&Point3::new(8.0, 1.2, -20.0)));
        assert!(!frame.in_footprint(&Point3::new(-0.1, 0.0, -2.0)));
        assert!(!frame.in_footprint(&Point3::new(8.1, 0.0, -2.0)));
        assert!(!frame.in_footprint(&Point3::new(4.0, 0.0, 0.5)));
        assert!(!frame.in_footprint(&Point3::new(4.0, 0.0, -20.5)));
    }

    #[test]
    fn normalize_spans_the_deck() {
        let frame = frame_at_origin();
        let (nx, nz) = frame.normalize(&Point3::new(4.0, 0.0, -10.0));
        assert!((nx - 0.5).abs() < 1e-6);
        assert!((nz - 0.5).abs() < 1e-6);
        let (nx, nz) = frame.normalize(&Point3::new(8.0, 0.0, -20.0));
        assert!((nx - 1.0).abs() < 1e-6);
        assert!((nz - 1.0).abs() < 1e-6);
    }

    // --- Slot centers ---

    #[test]
    fn slot_center_positions_identity_reference() {
        let frame = frame_at_origin();
        let c1l = frame.slot_center_world(Slot::new(1, Side::Left));
        let t = c1l.translation();
        assert!((t.x - 2.0).abs() < 1e-5);
        assert!(t.y.abs() < 1e-5);
        assert!((t.z + 2.5).abs() < 1e-5);

        let c3r = frame.slot_center_world(Slot::new(3, Side::Right));
        let t = c3r.translation();
        assert!((t.x - 6.0).abs() < 1e-5);
        assert!((t.z + 12.5).abs() < 1e-5);
    }

    #[test]
    fn slot_center_roundtrips_through_slot_at() {
        for frame in [frame_at_origin(), rotated_frame()] {
            for row in 1..=frame.total_rows() {
                for side in [Side::Left, Side::Right] {
                    let slot = Slot::new(row, side);
                    let center = frame.slot_center_world(slot);
                    assert_eq!(frame.slot_at(&center), slot, "slot {slot}");
                }
            }
        }
    }

    #[test]
    fn slot_center_stays_in_footprint() {
        let frame = rotated_frame();
        for row in 1..=4 {
            for side in [Side::Left, Side::Right] {
                let center = frame.slot_center_world(Slot::new(row, side));
                let local = frame.to_local(&center);
                assert!(frame.in_footprint(&local), "row {row}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "at least one row")]
    fn zero_rows_panics() {
        RampFrame::new(Pose::identity(), 8.0, 20.0, 0);
    }

    #[test]
    fn profile_sized_frame() {
        let profile = crate::profile::ProfileCatalog::builtin()
            .get("Boeing 737")
            .clone();
        let frame = RampFrame::for_profile(Pose::identity(), &profile);
        assert_eq!(frame.total_rows(), 3);
        assert!((frame.cell_width_m() - 3.0).abs() < 1e-6);
        assert!((frame.cell_height_m() - 5.0).abs() < 1e-6);
    }
}
