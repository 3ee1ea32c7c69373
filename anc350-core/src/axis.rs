use derive_more::Display;

use crate::{bitmask, positioner::PositionerError};

/// The number of axes on a single ANC350 controller.
pub const NUM_AXES: usize = 3;

/// An axis index in `0..NUM_AXES`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("axis {}", _0)]
pub struct Axis(u8);

impl Axis {
    /// The first axis.
    pub const X: Axis = Axis(0);
    /// The second axis.
    pub const Y: Axis = Axis(1);
    /// The third axis.
    pub const Z: Axis = Axis(2);

    /// Creates a new [`Axis`].
    ///
    /// # Errors
    ///
    /// Returns [`PositionerError::InvalidAxis`] if `idx` is not less than [`NUM_AXES`].
    pub const fn new(idx: u8) -> Result<Self, PositionerError> {
        if (idx as usize) < NUM_AXES {
            Ok(Self(idx))
        } else {
            Err(PositionerError::InvalidAxis(idx))
        }
    }

    /// The index of the axis.
    #[must_use]
    pub const fn idx(&self) -> usize {
        self.0 as usize
    }

    /// Iterates over all axes.
    pub fn all() -> impl Iterator<Item = Axis> {
        [Axis::X, Axis::Y, Axis::Z].into_iter()
    }
}

impl TryFrom<u8> for Axis {
    type Error = PositionerError;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        Axis::new(idx)
    }
}

impl From<Axis> for i32 {
    fn from(axis: Axis) -> Self {
        axis.0 as i32
    }
}

/// A set of axes, addressed by a bitmask where axis `i` is bit `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSet([bool; NUM_AXES]);

impl AxisSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self([false; NUM_AXES])
    }

    /// Adds an axis to the set.
    pub fn insert(&mut self, axis: Axis) {
        self.0[axis.idx()] = true;
    }

    /// Checks if the set contains `axis`.
    #[must_use]
    pub const fn contains(&self, axis: Axis) -> bool {
        self.0[axis.idx()]
    }

    /// Checks if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&b| b)
    }

    /// Iterates over the axes in the set in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::all().filter(|&axis| self.contains(axis))
    }

    /// The bitmask of the set.
    #[must_use]
    pub fn bits(&self) -> u64 {
        bitmask::encode(self.0)
    }
}

impl FromIterator<Axis> for AxisSet {
    fn from_iter<T: IntoIterator<Item = Axis>>(iter: T) -> Self {
        let mut set = AxisSet::new();
        iter.into_iter().for_each(|axis| set.insert(axis));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(Ok(Axis::X), 0)]
    #[case(Ok(Axis::Y), 1)]
    #[case(Ok(Axis::Z), 2)]
    #[case(Err(PositionerError::InvalidAxis(3)), 3)]
    #[case(Err(PositionerError::InvalidAxis(255)), 255)]
    #[test]
    fn new(#[case] expect: Result<Axis, PositionerError>, #[case] idx: u8) {
        assert_eq!(expect, Axis::new(idx));
        assert_eq!(expect, Axis::try_from(idx));
    }

    #[test]
    fn display() {
        assert_eq!("axis 1", Axis::Y.to_string());
    }

    #[rstest::rstest]
    #[case(0, vec![])]
    #[case(1, vec![Axis::X])]
    #[case(3, vec![Axis::X, Axis::Y])]
    #[case(6, vec![Axis::Z, Axis::Y])]
    #[case(7, vec![Axis::X, Axis::Y, Axis::Z])]
    #[test]
    fn axis_set_bits(#[case] expect: u64, #[case] axes: Vec<Axis>) {
        let set = axes.iter().copied().collect::<AxisSet>();
        assert_eq!(expect, set.bits());
        assert_eq!(axes.is_empty(), set.is_empty());
        let mut sorted = axes.clone();
        sorted.sort();
        assert_eq!(sorted, set.iter().collect::<Vec<_>>());
    }
}
