mod error;

pub use error::PositionerError;

use crate::{
    axis::Axis,
    position::{Move, Position},
    status::StatusFlags,
};

/// A trait that provides the interface with a connected positioner.
///
/// Connection, discovery and disconnection are the responsibility of the implementor. The controller only receives an already-connected positioner.
pub trait Positioner: Send {
    /// The status flags reported by [`Positioner::query_status`].
    type Status: StatusFlags;

    /// Queries the status of `axis` as a bitmask of [`Positioner::Status`].
    fn query_status(&mut self, axis: Axis) -> Result<u64, PositionerError>;

    /// Queries the current position of `axis`.
    fn query_position(&mut self, axis: Axis) -> Result<Position, PositionerError>;

    /// Starts a move of `axis`. A move already in progress on the axis is replaced.
    fn issue_move(&mut self, axis: Axis, mv: Move) -> Result<(), PositionerError>;

    /// Stops any motion of `axis`.
    fn issue_stop(&mut self, axis: Axis) -> Result<(), PositionerError>;

    /// Starts an approach of all `targets` at once.
    fn issue_move_sync(&mut self, targets: &[(Axis, Position)]) -> Result<(), PositionerError> {
        targets
            .iter()
            .try_for_each(|&(axis, target)| self.issue_move(axis, Move::Absolute(target)))
    }

    /// Closes the positioner.
    fn close(&mut self) -> Result<(), PositionerError>;

    /// Checks if the positioner is open.
    #[must_use]
    fn is_open(&self) -> bool;
}

impl<St: StatusFlags> Positioner for Box<dyn Positioner<Status = St>> {
    type Status = St;

    fn query_status(&mut self, axis: Axis) -> Result<u64, PositionerError> {
        self.as_mut().query_status(axis)
    }

    fn query_position(&mut self, axis: Axis) -> Result<Position, PositionerError> {
        self.as_mut().query_position(axis)
    }

    fn issue_move(&mut self, axis: Axis, mv: Move) -> Result<(), PositionerError> {
        self.as_mut().issue_move(axis, mv)
    }

    fn issue_stop(&mut self, axis: Axis) -> Result<(), PositionerError> {
        self.as_mut().issue_stop(axis)
    }

    fn issue_move_sync(&mut self, targets: &[(Axis, Position)]) -> Result<(), PositionerError> {
        self.as_mut().issue_move_sync(targets)
    }

    fn close(&mut self) -> Result<(), PositionerError> {
        self.as_mut().close()
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}
