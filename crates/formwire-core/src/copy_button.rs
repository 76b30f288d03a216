#![forbid(unsafe_code)]

//! Copy-button label state.
//!
//! After a successful clipboard write the button shows its "copied" markup
//! until a revert timer fires. Each success opens a new generation; only the
//! timer carrying the current generation may revert the label, so a timer
//! that the host failed to cancel is harmless.

use core::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CopyButtonState {
    Idle,
    Copied { generation: u64 },
}

/// Handle for one scheduled label revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevertTimer {
    pub generation: u64,
    pub delay: Duration,
}

/// Result of recording a successful copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTransition {
    /// Timer the host must schedule.
    pub schedule: RevertTimer,
    /// Pending timer the new one replaces, if any.
    pub cancel: Option<RevertTimer>,
}

#[derive(Debug, Clone)]
pub struct CopyButton {
    state: CopyButtonState,
    next_generation: u64,
    revert_delay: Duration,
}

impl CopyButton {
    #[must_use]
    pub const fn new(revert_delay: Duration) -> Self {
        Self {
            state: CopyButtonState::Idle,
            next_generation: 1,
            revert_delay,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CopyButtonState {
        self.state
    }

    #[must_use]
    pub const fn is_copied(&self) -> bool {
        matches!(self.state, CopyButtonState::Copied { .. })
    }

    fn pending(&self) -> Option<RevertTimer> {
        match self.state {
            CopyButtonState::Idle => None,
            CopyButtonState::Copied { generation } => Some(RevertTimer {
                generation,
                delay: self.revert_delay,
            }),
        }
    }

    /// Enter the copied state with a fresh generation.
    pub fn mark_copied(&mut self) -> CopyTransition {
        let cancel = self.pending();
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.state = CopyButtonState::Copied { generation };
        CopyTransition {
            schedule: RevertTimer {
                generation,
                delay: self.revert_delay,
            },
            cancel,
        }
    }

    /// Return to idle if `timer` is the current generation.
    ///
    /// Returns `false` for stale timers and when already idle.
    pub fn revert(&mut self, timer: RevertTimer) -> bool {
        match self.state {
            CopyButtonState::Copied { generation } if generation == timer.generation => {
                self.state = CopyButtonState::Idle;
                true
            }
            _ => false,
        }
    }
}
