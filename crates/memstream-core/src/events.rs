use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capabilities::{OverlayAction, PromptChoice};
use crate::social::SocialPlatform;

/// Which nag timer produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Escalation,
    SharePrompt,
}

/// Everything the nag timers do is published as an Event.
/// UI layers and the CLI subscribe through a broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerArmed {
        timer: TimerKind,
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    /// Snooze active; the timer will retry when it ends.
    CycleDeferred {
        timer: TimerKind,
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    AttemptStarted {
        photo_id: String,
        step: u32,
        at: DateTime<Utc>,
    },
    DirectPostCompleted {
        platform: SocialPlatform,
        url: Option<String>,
        error: Option<String>,
        at: DateTime<Utc>,
    },
    OverlayResolved {
        action: OverlayAction,
        at: DateTime<Utc>,
    },
    OverlayUnavailable {
        reason: String,
        at: DateTime<Utc>,
    },
    NotificationFallback {
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    ClipboardFallback {
        url: String,
        at: DateTime<Utc>,
    },
    EscalationStepped {
        step: u32,
        next_delay_ms: u64,
        at: DateTime<Utc>,
    },
    EscalationReset {
        at: DateTime<Utc>,
    },
    SnoozeSet {
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SharePromptShown {
        photo_id: String,
        candidates: usize,
        at: DateTime<Utc>,
    },
    /// Public sharing needs a web URL; local photos are left alone.
    PublicShareSkipped {
        photo_id: String,
        url: String,
        at: DateTime<Utc>,
    },
    SharePromptResolved {
        photo_id: String,
        choice: PromptChoice,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::SnoozeSet {
            until: Utc::now(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SnoozeSet");
    }
}
