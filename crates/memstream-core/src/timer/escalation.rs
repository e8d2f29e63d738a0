//! Escalation state machine.
//!
//! ```text
//! IDLE ──photos──▶ ARMED ──interval──▶ ATTEMPTING ──▶ SUCCESS   (step = 0, snooze, longest interval)
//!                    ▲                     │
//!                    └─────────────────────┴────────▶ DISMISSED (step + 1, shorter interval)
//! ```
//!
//! The transition is a pure function of `(state, outcome)`; the async runner
//! in [`super::EscalationTimer`] performs the side effects and feeds the
//! outcome back in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::EscalationConfig;

/// Timing for the escalation timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Retry intervals indexed by step, longest first. Never empty.
    pub intervals: Vec<Duration>,
    /// Snooze applied after any handled attempt.
    pub cool_down: Duration,
    pub countdown_secs: u32,
    /// Wait between the local notification and the fallback post.
    pub notification_delay: Duration,
    pub overlay_title: String,
    pub overlay_message: String,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        EscalationConfig::default().policy()
    }
}

impl EscalationPolicy {
    /// Interval for `step`, clamped to the shortest once past the table end.
    pub fn interval_for(&self, step: u32) -> Duration {
        let last = self.intervals.len().saturating_sub(1);
        let idx = (step as usize).min(last);
        self.intervals.get(idx).copied().unwrap_or_default()
    }

    pub fn longest(&self) -> Duration {
        self.intervals.iter().copied().max().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationState {
    pub step: u32,
}

/// How one attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Posted straight to at least one connected platform.
    DirectPosted,
    /// Overlay accepted (or timed out) and the share sheet took it.
    SharedToApp,
    PostedAfterOverlay,
    CopiedAfterOverlay,
    NotifiedThenPosted,
    NotifiedThenCopied,
    /// The user explicitly dismissed the overlay.
    Dismissed,
    /// Disposed mid-attempt; nothing further happened.
    Cancelled,
}

impl CycleOutcome {
    pub fn is_success(self) -> bool {
        !matches!(self, CycleOutcome::Dismissed | CycleOutcome::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: EscalationState,
    pub next_delay: Duration,
    /// Snooze to apply, if any.
    pub snooze: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct EscalationMachine {
    policy: EscalationPolicy,
}

impl EscalationMachine {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Freshly armed (or re-armed after the photo set refilled).
    pub fn initial(&self) -> Transition {
        Transition {
            state: EscalationState::default(),
            next_delay: self.policy.longest(),
            snooze: None,
        }
    }

    pub fn apply(&self, state: EscalationState, outcome: CycleOutcome) -> Transition {
        match outcome {
            CycleOutcome::Dismissed => {
                let step = state.step.saturating_add(1);
                Transition {
                    state: EscalationState { step },
                    next_delay: self.policy.interval_for(step),
                    snooze: None,
                }
            }
            CycleOutcome::Cancelled => Transition {
                state,
                next_delay: self.policy.interval_for(state.step),
                snooze: None,
            },
            _ => Transition {
                state: EscalationState::default(),
                next_delay: self.policy.longest(),
                snooze: Some(self.policy.cool_down),
            },
        }
    }
}
