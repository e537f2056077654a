// src/metric.rs

//! Per-level measures of cell size.
//!
//! A metric is `deriv * 2^(-dim * level)`: a length (dim 1) or an area (dim 2) that scales
//! predictably with level, which lets callers pick the level whose cells fit a given size.

use crate::constants::{MAX_LEVEL, M_PI, M_SQRT2, M_SQRT3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
  /// 1 for lengths, 2 for areas.
  pub dim: i32,
  /// Scale factor at level 0.
  pub deriv: f64,
}

pub const MIN_ANGLE_SPAN: Metric = Metric { dim: 1, deriv: 4.0 / 3.0 };
pub const AVG_ANGLE_SPAN: Metric = Metric { dim: 1, deriv: M_PI / 4.0 };
pub const MAX_ANGLE_SPAN: Metric = Metric { dim: 1, deriv: 1.704_897_179_199_218_452 };

/// Minimum width: the shortest distance between opposite edges of any cell at a level.
pub const MIN_WIDTH: Metric = Metric { dim: 1, deriv: 2.0 * M_SQRT2 / 3.0 };
pub const AVG_WIDTH: Metric = Metric { dim: 1, deriv: 1.434_523_672_886_099_389 };
pub const MAX_WIDTH: Metric = MAX_ANGLE_SPAN;

pub const MIN_EDGE: Metric = Metric { dim: 1, deriv: 2.0 * M_SQRT2 / 3.0 };
pub const AVG_EDGE: Metric = Metric { dim: 1, deriv: 1.459_213_746_386_106_062 };
pub const MAX_EDGE: Metric = MAX_ANGLE_SPAN;

pub const MIN_DIAG: Metric = Metric { dim: 1, deriv: 8.0 * M_SQRT2 / 9.0 };
pub const AVG_DIAG: Metric = Metric { dim: 1, deriv: 2.060_422_738_998_471_683 };
pub const MAX_DIAG: Metric = Metric { dim: 1, deriv: 2.438_654_594_434_021_032 };

pub const MIN_AREA: Metric = Metric { dim: 2, deriv: 8.0 * M_SQRT2 / 9.0 };
pub const AVG_AREA: Metric = Metric { dim: 2, deriv: 4.0 * M_PI / 6.0 };
pub const MAX_AREA: Metric = Metric { dim: 2, deriv: 2.635_799_256_963_161_491 };

/// Maximum ratio of a cell's longest edge to its shortest.
pub const MAX_EDGE_ASPECT: f64 = 1.442_615_274_452_682_92;
/// Maximum ratio of a cell's longest diagonal to its shortest.
pub const MAX_DIAG_ASPECT: f64 = M_SQRT3;

/// Binary exponent of `x`, i.e. `floor(log2(|x|))`.
fn ilogb(x: f64) -> i32 {
  if x == 0.0 || !x.is_finite() {
    return i32::MIN;
  }
  let biased = ((x.to_bits() >> 52) & 0x7ff) as i32;
  if biased == 0 {
    return x.abs().log2().floor() as i32;
  }
  biased - 1023
}

impl Metric {
  /// Value of the metric at `level`.
  #[must_use]
  pub fn value(&self, level: i32) -> f64 {
    self.deriv * 2f64.powi(-self.dim * level)
  }

  /// Minimum level such that the metric is at most `val`, or `MAX_LEVEL` if none is.
  #[must_use]
  pub fn min_level(&self, val: f64) -> i32 {
    if val <= 0.0 {
      return MAX_LEVEL;
    }
    let level = -(ilogb(val / self.deriv) >> (self.dim - 1));
    level.clamp(0, MAX_LEVEL)
  }

  /// Maximum level such that the metric is at least `val`, or 0 if none is.
  #[must_use]
  pub fn max_level(&self, val: f64) -> i32 {
    if val <= 0.0 {
      return MAX_LEVEL;
    }
    let level = ilogb(self.deriv / val) >> (self.dim - 1);
    level.clamp(0, MAX_LEVEL)
  }

  /// Level whose metric is closest to `val`.
  #[must_use]
  pub fn closest_level(&self, val: f64) -> i32 {
    let x = if self.dim == 2 { 2.0 } else { M_SQRT2 };
    self.min_level(x * val)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_metric_ordering() {
    assert!(MIN_WIDTH.deriv <= AVG_WIDTH.deriv && AVG_WIDTH.deriv <= MAX_WIDTH.deriv);
    assert!(MIN_AREA.deriv <= AVG_AREA.deriv && AVG_AREA.deriv <= MAX_AREA.deriv);
    assert!(MIN_DIAG.deriv <= AVG_DIAG.deriv && AVG_DIAG.deriv <= MAX_DIAG.deriv);
    assert!((AVG_AREA.value(0) * 6.0 - 4.0 * M_PI).abs() < 1e-15);
  }

  #[test]
  fn test_level_selection() {
    for level in [0, 1, 10, 29] {
      let width = MIN_WIDTH.value(level);
      assert_eq!(MIN_WIDTH.min_level(width), level);
      assert_eq!(MIN_WIDTH.max_level(width), level);
      assert_eq!(MIN_WIDTH.min_level(width * 1.2), level);
      assert_eq!(MIN_WIDTH.max_level(width * 0.8), level);
      let area = AVG_AREA.value(level);
      assert_eq!(AVG_AREA.closest_level(area), level);
    }
    assert_eq!(MIN_WIDTH.min_level(-1.0), MAX_LEVEL);
    assert_eq!(MIN_WIDTH.max_level(10.0), 0);
  }
}
