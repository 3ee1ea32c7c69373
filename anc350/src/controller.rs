mod cancel;
mod option;
mod session;

pub use cancel::CancelToken;
pub use option::PollOption;
pub use session::{MotionTarget, PollSession, PollState};

use anc350_core::{
    axis::{Axis, AxisSet, NUM_AXES},
    position::{Move, Position},
    positioner::Positioner,
    sleep::{Sleep, StdSleeper},
    status::StatusFlags,
};
use getset::{Getters, MutGetters};
use itertools::Itertools;

use crate::error::ANC350Error;

/// A controller for the ANC350 positioner.
///
/// All moves are issued through this struct. Each move returns a [`PollSession`] which is driven to completion by [`Controller::wait`].
///
/// Only one session is active per axis. Issuing a new move on an axis cancels the session that previously addressed it, but the axis keeps following the new move.
#[derive(Getters, MutGetters)]
pub struct Controller<P: Positioner, S: Sleep = StdSleeper> {
    /// The positioner.
    #[getset(get = "pub", get_mut = "pub")]
    positioner: P,
    /// The sleeper used between status samples.
    #[getset(get = "pub")]
    sleeper: S,
    sessions: [Option<CancelToken>; NUM_AXES],
    /// The default poll option used for [`move_axis`](Controller::move_axis) and [`move_sync`](Controller::move_sync).
    pub default_poll_option: PollOption,
}

impl<P: Positioner> Controller<P, StdSleeper> {
    /// Equivalent to [`Self::open_with`] with [`StdSleeper`] and default [`PollOption`].
    pub fn open(positioner: P) -> Self {
        Self::open_with(positioner, StdSleeper, PollOption::default())
    }
}

impl<P: Positioner, S: Sleep> Controller<P, S> {
    /// Creates a controller with a sleeper and a default [`PollOption`].
    ///
    /// The positioner must be already connected.
    pub fn open_with(positioner: P, sleeper: S, option: PollOption) -> Self {
        tracing::debug!("Open controller with {:?}", option);
        Self {
            positioner,
            sleeper,
            sessions: Default::default(),
            default_poll_option: option,
        }
    }

    /// Queries and decodes the status of `axis`.
    pub fn status(&mut self, axis: Axis) -> Result<P::Status, ANC350Error> {
        let bits = self.positioner.query_status(axis)?;
        Ok(P::Status::decode(bits)?)
    }

    /// Queries the position of `axis`.
    pub fn position(&mut self, axis: Axis) -> Result<Position, ANC350Error> {
        Ok(self.positioner.query_position(axis)?)
    }

    /// Equivalent to [`Self::move_axis_with`] with the default poll option.
    pub fn move_axis(
        &mut self,
        axis: Axis,
        mv: Move,
    ) -> Result<PollSession<P::Status>, ANC350Error> {
        self.move_axis_with(axis, mv, self.default_poll_option)
    }

    /// Starts a move of a single axis and returns the session that waits for it.
    #[tracing::instrument(skip(self))]
    pub fn move_axis_with(
        &mut self,
        axis: Axis,
        mv: Move,
        option: PollOption,
    ) -> Result<PollSession<P::Status>, ANC350Error> {
        let target = match mv {
            Move::Continuous(dir) => MotionTarget::Continuous(axis, dir),
            mv => MotionTarget::Approach(axis, mv),
        };
        let mut session = PollSession::new(target, option, CancelToken::new());
        self.positioner.issue_move(axis, mv)?;
        self.register(&mut session);
        Ok(session)
    }

    /// Equivalent to [`Self::move_sync_with`] with the default poll option.
    pub fn move_sync(
        &mut self,
        targets: &[(Axis, Position)],
    ) -> Result<PollSession<P::Status>, ANC350Error> {
        self.move_sync_with(targets, self.default_poll_option)
    }

    /// Starts a synchronized approach of a group of axes and returns the session that waits for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`ANC350Error::InvalidGroup`] if `targets` is empty or addresses an axis more than once.
    #[tracing::instrument(skip(self))]
    pub fn move_sync_with(
        &mut self,
        targets: &[(Axis, Position)],
        option: PollOption,
    ) -> Result<PollSession<P::Status>, ANC350Error> {
        if targets.is_empty() {
            return Err(ANC350Error::InvalidGroup("no axis".to_string()));
        }
        if let Some(axis) = targets.iter().map(|&(axis, _)| axis).duplicates().next() {
            return Err(ANC350Error::InvalidGroup(format!("{} appears twice", axis)));
        }

        let mut session = PollSession::new(
            MotionTarget::Sync(targets.to_vec()),
            option,
            CancelToken::new(),
        );
        self.positioner.issue_move_sync(targets)?;
        self.register(&mut session);
        Ok(session)
    }

    /// Stops `axis` and cancels its session.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self, axis: Axis) -> Result<(), ANC350Error> {
        if let Some(token) = self.sessions[axis.idx()].take() {
            token.cancel();
        }
        Ok(self.positioner.issue_stop(axis)?)
    }

    /// Waits for `session` to reach a terminal state.
    ///
    /// Returns `Ok(())` if all axes of the session reached their target. Every other terminal state is returned as an error, and the state and the last decoded status remain available on the session.
    pub fn wait(&mut self, session: &mut PollSession<P::Status>) -> Result<(), ANC350Error> {
        let owned = self.owned_axes(session);
        session.run(&mut self.positioner, &self.sleeper, owned)
    }

    /// Same as [`Self::wait`], but sleeps between samples with `sleeper`.
    pub fn wait_with(
        &mut self,
        session: &mut PollSession<P::Status>,
        sleeper: &(impl Sleep + ?Sized),
    ) -> Result<(), ANC350Error> {
        let owned = self.owned_axes(session);
        session.run(&mut self.positioner, sleeper, owned)
    }

    /// Closes the controller.
    pub fn close(mut self) -> Result<(), ANC350Error> {
        self.close_impl()
    }

    fn owned_axes(&self, session: &PollSession<P::Status>) -> AxisSet {
        let token = session.cancel_token();
        session
            .axes()
            .iter()
            .filter(|axis| {
                self.sessions[axis.idx()]
                    .as_ref()
                    .is_some_and(|owner| owner.is_same(&token))
            })
            .collect()
    }

    fn register(&mut self, session: &mut PollSession<P::Status>) {
        let token = session.cancel_token();
        session.axes().iter().for_each(|axis| {
            if let Some(prev) = self.sessions[axis.idx()].replace(token.clone()) {
                tracing::trace!("Supersede the previous session on {}", axis);
                prev.cancel();
            }
        });
        session.start();
    }

    fn close_impl(&mut self) -> Result<(), ANC350Error> {
        if !self.positioner.is_open() {
            return Ok(());
        }
        self.sessions
            .iter_mut()
            .filter_map(Option::take)
            .for_each(|token| token.cancel());
        Ok(self.positioner.close()?)
    }
}

impl<P: Positioner, S: Sleep> Drop for Controller<P, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close_impl() {
            tracing::error!("Failed to close the positioner: {}", e);
        }
    }
}
