// src/query/distance.rs

use std::fmt::Debug;

use crate::math::s1::ChordAngle;

/// A distance measure that edge queries optimize.
///
/// "Less" means better: closer for [`MinDistance`], further for [`MaxDistance`]. Queries are
/// written once against this trait and search for the least distances.
pub trait Distance: Copy + Debug + PartialEq + Send + Sync {
  fn from_chord_angle(c: ChordAngle) -> Self;

  fn chord_angle(self) -> ChordAngle;

  /// The best possible distance: the target touches the feature.
  fn zero() -> Self;

  /// Worse than every distance; the initial limit of an unbounded query.
  fn infinity() -> Self;

  /// Better than every distance.
  fn negative() -> Self;

  /// Whether `self` is strictly better than `other`.
  fn less(self, other: Self) -> bool;

  /// The distance made better by `delta`, saturating at the best valid distance.
  fn sub(self, delta: ChordAngle) -> Self;

  /// An upper bound on the angle from the target within which features at this distance lie.
  fn chord_angle_bound(self) -> ChordAngle;

  /// Replaces `self` with `other` if it is better. Returns whether it did.
  fn update(&mut self, other: Self) -> bool {
    if other.less(*self) {
      *self = other;
      return true;
    }
    false
  }
}

/// Distance to the closest point of a feature.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MinDistance(pub ChordAngle);

impl Distance for MinDistance {
  fn from_chord_angle(c: ChordAngle) -> Self {
    MinDistance(c)
  }

  fn chord_angle(self) -> ChordAngle {
    self.0
  }

  fn zero() -> Self {
    MinDistance(ChordAngle::ZERO)
  }

  fn infinity() -> Self {
    MinDistance(ChordAngle::infinity())
  }

  fn negative() -> Self {
    MinDistance(ChordAngle::negative())
  }

  fn less(self, other: Self) -> bool {
    self.0 < other.0
  }

  fn sub(self, delta: ChordAngle) -> Self {
    if self.0.is_special() {
      return self;
    }
    MinDistance(self.0 - delta)
  }

  fn chord_angle_bound(self) -> ChordAngle {
    self.0
  }
}

/// Distance to the furthest point of a feature.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MaxDistance(pub ChordAngle);

impl Distance for MaxDistance {
  fn from_chord_angle(c: ChordAngle) -> Self {
    MaxDistance(c)
  }

  fn chord_angle(self) -> ChordAngle {
    self.0
  }

  fn zero() -> Self {
    MaxDistance(ChordAngle::STRAIGHT)
  }

  fn infinity() -> Self {
    MaxDistance(ChordAngle::negative())
  }

  fn negative() -> Self {
    MaxDistance(ChordAngle::infinity())
  }

  fn less(self, other: Self) -> bool {
    self.0 > other.0
  }

  fn sub(self, delta: ChordAngle) -> Self {
    if self.0.is_special() {
      return self;
    }
    MaxDistance(self.0 + delta)
  }

  fn chord_angle_bound(self) -> ChordAngle {
    if self.0.is_negative() {
      return ChordAngle::STRAIGHT;
    }
    ChordAngle::STRAIGHT - self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_min_distance_ordering() {
    let near = MinDistance(ChordAngle::from_squared_length(0.1));
    let far = MinDistance(ChordAngle::from_squared_length(0.5));
    assert!(near.less(far));
    assert!(MinDistance::zero().less(near));
    assert!(far.less(MinDistance::infinity()));
    assert!(MinDistance::negative().less(MinDistance::zero()));
    let mut d = far;
    assert!(d.update(near));
    assert!(!d.update(far));
    assert_eq!(d, near);
    assert_eq!(MinDistance::infinity().sub(ChordAngle::RIGHT), MinDistance::infinity());
    assert_eq!(near.sub(ChordAngle::RIGHT), MinDistance::zero());
  }

  #[test]
  fn test_max_distance_ordering() {
    let near = MaxDistance(ChordAngle::from_squared_length(0.1));
    let far = MaxDistance(ChordAngle::from_squared_length(0.5));
    assert!(far.less(near));
    assert!(MaxDistance::zero().less(far));
    assert!(near.less(MaxDistance::infinity()));
    assert!(MaxDistance::negative().less(MaxDistance::zero()));
    assert_eq!(far.sub(ChordAngle::STRAIGHT), MaxDistance::zero());
    assert_eq!(MaxDistance::infinity().chord_angle_bound(), ChordAngle::STRAIGHT);
    assert_eq!(MaxDistance::zero().chord_angle_bound(), ChordAngle::ZERO);
  }
}
