//! Discrete ramp slots: row number plus left/right side.
//!
//! Slots are the unit of placement on the deck. Rows count from 1 at the
//! reference edge; every row has a Left and a Right slot. The canonical
//! code form is `<row><L|R>`, e.g. `"2R"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the ramp a slot sits on, seen from the reference corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Single-letter code used in slot strings.
    pub fn code(&self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Parse a side letter, case-insensitively.
    pub fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(Side::Left),
            'R' => Some(Side::Right),
            _ => None,
        }
    }
}

/// One discrete slot on the ramp grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// 1-based row, counted from the reference edge.
    pub row: u32,
    pub side: Side,
}

impl Slot {
    pub fn new(row: u32, side: Side) -> Self {
        Self { row, side }
    }

    /// Canonical code, e.g. `"2R"`.
    pub fn code(&self) -> String {
        format!("{}{}", self.row, self.side.code())
    }

    /// Parse a code like `"2R"` or `"10l"`. Returns `None` for anything
    /// malformed: empty input, missing or zero row, unknown side letter.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        let side_ch = code.chars().last()?;
        let side = Side::from_code(side_ch)?;
        let row: u32 = code[..code.len() - side_ch.len_utf8()].parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self { row, side })
    }

    /// Slot from normalized deck coordinates.
    ///
    /// `nx` runs 0..1 across the width (left to right) and `nz` runs 0..1
    /// down the length (reference edge to far edge). Out-of-range inputs
    /// clamp into the grid rather than fail: live tracking jitters past
    /// the deck boundary constantly, and callers reject out-of-footprint
    /// poses separately.
    ///
    /// # Panics
    /// If `total_rows` is zero.
    pub fn from_normalized(nx: f32, nz: f32, total_rows: u32) -> Self {
        assert!(total_rows > 0, "ramp must have at least one row");
        let side = if nx < 0.5 { Side::Left } else { Side::Right };
        let idx = (nz * total_rows as f32)
            .floor()
            .clamp(0.0, (total_rows - 1) as f32);
        Self {
            row: idx as u32 + 1,
            side,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.side.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip_all_slots() {
        for row in 1..=20u32 {
            for side in [Side::Left, Side::Right] {
                let slot = Slot::new(row, side);
                assert_eq!(Slot::parse(&slot.code()), Some(slot));
            }
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(Slot::parse("2r"), Some(Slot::new(2, Side::Right)));
        assert_eq!(Slot::parse("10l"), Some(Slot::new(10, Side::Left)));
        assert_eq!(Slot::parse("  3L "), Some(Slot::new(3, Side::Left)));
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        assert_eq!(Slot::parse(""), None);
        assert_eq!(Slot::parse("L"), None);
        assert_eq!(Slot::parse("5"), None);
        assert_eq!(Slot::parse("5X"), None);
        assert_eq!(Slot::parse("0R"), None);
        assert_eq!(Slot::parse("-1L"), None);
        assert_eq!(Slot::parse("2 R"), None);
        assert_eq!(Slot::parse("a2R"), None);
    }

    // --- from_normalized ---

    #[test]
    fn normalized_interior_points() {
        assert_eq!(
            Slot::from_normalized(0.2, 0.1, 4),
            Slot::new(1, Side::Left)
        );
        assert_eq!(
            Slot::from_normalized(0.8, 0.6, 4),
            Slot::new(3, Side::Right)
        );
    }

    #[test]
    fn normalized_midline_counts_as_right() {
        assert_eq!(
            Slot::from_normalized(0.5, 0.0, 4),
            Slot::new(1, Side::Right)
        );
    }

    #[test]
    fn normalized_out_of_range_clamps() {
        // Overshoot past the far edge lands in the last row.
        assert_eq!(
            Slot::from_normalized(0.9, 1.5, 4),
            Slot::new(4, Side::Right)
        );
        // Behind the reference edge lands in row 1.
        assert_eq!(
            Slot::from_normalized(0.1, -0.7, 4),
            Slot::new(1, Side::Left)
        );
        // nz exactly 1.0 is past the last row boundary, still row N.
        assert_eq!(
            Slot::from_normalized(0.0, 1.0, 4),
            Slot::new(4, Side::Left)
        );
    }

    #[test]
    #[should_panic(expected = "at least one row")]
    fn normalized_zero_rows_panics() {
        Slot::from_normalized(0.5, 0.5, 0);
    }

    #[test]
    fn display_matches_code() {
        let slot = Slot::new(7, Side::Left);
        assert_eq!(format!("{slot}"), slot.code());
    }
}
