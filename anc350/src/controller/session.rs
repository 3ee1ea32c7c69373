use std::time::{Duration, Instant};

use anc350_core::{
    axis::{Axis, AxisSet, NUM_AXES},
    position::{Direction, Move, Position},
    positioner::Positioner,
    sleep::Sleep,
    status::{Fault, StatusFlags},
};
use derive_more::Display;
use getset::{CopyGetters, Getters};
use itertools::Itertools;

use super::{CancelToken, PollOption};
use crate::error::ANC350Error;

/// The state of a [`PollSession`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// The session has been created but the move has not been issued.
    Idle,
    /// The move has been issued and the axes are being sampled.
    Moving,
    /// All axes reached their target.
    Reached,
    /// A fault was observed or the status query failed.
    Faulted,
    /// The timeout elapsed before the target was reached.
    TimedOut,
    /// The session was cancelled.
    Cancelled,
}

impl PollState {
    /// Checks if the state is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Reached | PollState::Faulted | PollState::TimedOut | PollState::Cancelled
        )
    }
}

/// The motion goal of a [`PollSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum MotionTarget {
    /// Absolute or relative approach of a single axis.
    Approach(Axis, Move),
    /// Synchronized approach of a group of axes.
    Sync(Vec<(Axis, Position)>),
    /// Continuous motion of a single axis. Only ends by cancellation.
    Continuous(Axis, Direction),
}

impl std::fmt::Display for MotionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionTarget::Approach(axis, mv) => write!(f, "{} {}", axis, mv),
            MotionTarget::Sync(targets) => write!(
                f,
                "sync({})",
                targets
                    .iter()
                    .format_with(", ", |(axis, pos), f| f(&format_args!("{}: {}", axis, pos)))
            ),
            MotionTarget::Continuous(axis, dir) => write!(f, "{} continuous({})", axis, dir),
        }
    }
}

impl MotionTarget {
    /// The axes addressed by the target.
    #[must_use]
    pub fn axes(&self) -> AxisSet {
        match self {
            MotionTarget::Approach(axis, _) | MotionTarget::Continuous(axis, _) => {
                [*axis].into_iter().collect()
            }
            MotionTarget::Sync(targets) => targets.iter().map(|&(axis, _)| axis).collect(),
        }
    }

    /// Checks if the target is a continuous motion.
    #[must_use]
    pub const fn is_continuous(&self) -> bool {
        matches!(self, MotionTarget::Continuous(..))
    }
}

/// One in-progress wait for motion completion.
///
/// A session is created by the move methods of [`Controller`] and driven by [`Controller::wait`]. Once the session reaches a terminal [`PollState`], waiting again returns the same result without sampling.
///
/// [`Controller`]: crate::Controller
/// [`Controller::wait`]: crate::Controller::wait
#[derive(Debug, Getters, CopyGetters)]
pub struct PollSession<St: StatusFlags> {
    /// The motion goal.
    #[getset(get = "pub")]
    target: MotionTarget,
    /// The axes sampled each iteration.
    #[getset(get_copy = "pub")]
    axes: AxisSet,
    /// The poll option.
    #[getset(get_copy = "pub")]
    option: PollOption,
    /// The current state.
    #[getset(get_copy = "pub")]
    state: PollState,
    /// The number of completed sampling iterations.
    #[getset(get_copy = "pub")]
    samples: usize,
    statuses: [Option<St>; NUM_AXES],
    cancel: CancelToken,
    started: Instant,
    outcome: Option<Result<(), ANC350Error>>,
}

impl<St: StatusFlags> PollSession<St> {
    pub(crate) fn new(target: MotionTarget, option: PollOption, cancel: CancelToken) -> Self {
        Self {
            axes: target.axes(),
            target,
            option,
            state: PollState::Idle,
            samples: 0,
            statuses: [None; NUM_AXES],
            cancel,
            started: Instant::now(),
            outcome: None,
        }
    }

    pub(crate) fn start(&mut self) {
        self.started = Instant::now();
        self.transition(PollState::Moving);
    }

    /// The last decoded status of `axis`, or `None` if the axis has not been sampled.
    #[must_use]
    pub fn status(&self, axis: Axis) -> Option<St> {
        self.statuses[axis.idx()]
    }

    /// Returns a token that cancels this session.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Requests cancellation of this session.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drives the session to a terminal state.
    ///
    /// `owned` are the axes still assigned to this session. A cancelled continuous move only stops those axes, so a superseding move is left running.
    #[tracing::instrument(level = "debug", skip_all, fields(target = %self.target))]
    pub(crate) fn run<P: Positioner<Status = St>, S: Sleep + ?Sized>(
        &mut self,
        positioner: &mut P,
        sleeper: &S,
        owned: AxisSet,
    ) -> Result<(), ANC350Error> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let outcome = self.run_impl(positioner, sleeper, owned);
        if outcome.is_err() && !self.state.is_terminal() {
            self.transition(PollState::Faulted);
        }
        self.outcome = Some(outcome.clone());
        outcome
    }

    // The first sample is taken one interval after the move was issued, since the device raises `moving` with a delay.
    fn run_impl<P: Positioner<Status = St>, S: Sleep + ?Sized>(
        &mut self,
        positioner: &mut P,
        sleeper: &S,
        owned: AxisSet,
    ) -> Result<(), ANC350Error> {
        let continuous = self.target.is_continuous();
        let deadline = self
            .option
            .timeout
            .filter(|_| !continuous)
            .map(|timeout| (timeout, self.started + timeout));

        let mut tick = self.started;
        loop {
            if self.cancel.is_cancelled() {
                return self.cancelled(positioner, owned);
            }

            let next = tick + self.option.interval;
            sleeper.sleep_until(deadline.map_or(next, |(_, deadline)| next.min(deadline)));
            tick = next;

            if self.cancel.is_cancelled() {
                return self.cancelled(positioner, owned);
            }

            self.sample(positioner)?;

            if let Some((axis, fault, status)) = self.fault() {
                if !continuous {
                    tracing::warn!("{} faulted ({}), status: {:#b}", axis, fault, status);
                    self.transition(PollState::Faulted);
                    return Err(ANC350Error::Faulted {
                        axis,
                        fault,
                        status,
                    });
                }
                tracing::warn!("{} reports {} while moving continuously", axis, fault);
            }

            if !continuous && self.is_reached() {
                self.transition(PollState::Reached);
                return Ok(());
            }

            if let Some((timeout, deadline)) = deadline {
                if Instant::now() >= deadline {
                    self.transition(PollState::TimedOut);
                    return Err(ANC350Error::Timeout(timeout));
                }
            }
        }
    }

    fn sample<P: Positioner<Status = St>>(&mut self, positioner: &mut P) -> Result<(), ANC350Error> {
        self.samples += 1;
        let axes = self.axes;
        for axis in axes.iter() {
            let bits = positioner.query_status(axis).map_err(|e| {
                tracing::error!("Failed to query the status of {}: {}", axis, e);
                e
            })?;
            let status = St::decode(bits)?;
            tracing::trace!("sample {}: {}: {:?} ({:#b})", self.samples, axis, status, bits);
            self.statuses[axis.idx()] = Some(status);
        }
        Ok(())
    }

    fn fault(&self) -> Option<(Axis, Fault, u64)> {
        self.axes.iter().find_map(|axis| {
            self.statuses[axis.idx()]
                .and_then(|status| status.fault().map(|fault| (axis, fault, status.encode())))
        })
    }

    fn is_reached(&self) -> bool {
        self.axes.iter().all(|axis| {
            self.statuses[axis.idx()].is_some_and(|status| status.is_target_reached())
        })
    }

    fn cancelled<P: Positioner<Status = St>>(
        &mut self,
        positioner: &mut P,
        owned: AxisSet,
    ) -> Result<(), ANC350Error> {
        if self.target.is_continuous() {
            for axis in self.axes.iter() {
                if !owned.contains(axis) {
                    tracing::debug!("{} is driven by a newer move", axis);
                    continue;
                }
                tracing::debug!("Stop {}", axis);
                positioner.issue_stop(axis).map_err(|e| {
                    tracing::error!("Failed to stop {}: {}", axis, e);
                    e
                })?;
            }
        }
        self.transition(PollState::Cancelled);
        Err(ANC350Error::Cancelled)
    }

    fn transition(&mut self, next: PollState) {
        tracing::debug!(
            "{} -> {} after {} samples ({:?})",
            self.state,
            next,
            self.samples,
            self.elapsed()
        );
        self.state = next;
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
