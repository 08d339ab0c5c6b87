//! Boot classification and the sleep-cycle state machine.
//!
//! The node never loops in memory: each cycle ends in standby and the next
//! one begins with a full restart. The platform reports why the restart
//! happened; everything the pipeline needs from that report is the one-bit
//! timer-vs-anything-else classification modeled here.

use core::fmt;

/// Platform-reported reason the current boot began.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WakeCause {
    /// The armed standby timer fired: this boot resumes a monitoring run.
    Timer,
    /// Power-on, external reset, or any other non-timer cause: this boot
    /// starts a fresh monitoring run.
    Cold,
}

impl WakeCause {
    /// Returns `true` when this boot resumes from the armed timer.
    pub const fn is_timer_wake(self) -> bool {
        matches!(self, WakeCause::Timer)
    }
}

impl fmt::Display for WakeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WakeCause::Timer => f.write_str("timer"),
            WakeCause::Cold => f.write_str("cold"),
        }
    }
}

/// Selects the accumulator value the first cycle of this boot starts from.
///
/// The stored total is always loaded first; a cold boot overrides the loaded
/// value with zero, a timer wake resumes from it unchanged.
#[must_use]
pub const fn initial_total(cause: WakeCause, stored_kwh: f32) -> f32 {
    match cause {
        WakeCause::Timer => stored_kwh,
        WakeCause::Cold => 0.0,
    }
}

/// Lifecycle of one boot of the node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SleepPhase {
    /// Tasks may run; the pipeline owns the processor.
    Running,
    /// Standby has been committed. Terminal: the only way out is a full
    /// restart with [`WakeCause::Timer`].
    Suspended,
}

impl SleepPhase {
    /// Returns `true` when no further code runs in this boot.
    pub const fn is_terminal(self) -> bool {
        matches!(self, SleepPhase::Suspended)
    }
}

/// Failure during subsystem bring-up, before any task is spawned.
///
/// Fatal by policy: the node halts cleanly rather than scheduling tasks over
/// undefined shared state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InitError {
    /// The durable store subsystem could not be brought up.
    StoreUnavailable,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::StoreUnavailable => f.write_str("durable store unavailable"),
        }
    }
}
