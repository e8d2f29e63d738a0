//! The two nag timers and the state machine behind the escalating one.

mod escalation;
mod runner;
mod share_prompt;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::capabilities::Capabilities;
use crate::clock::Clock;
use crate::events::Event;
use crate::lifecycle::Lifecycle;
use crate::model::Photo;
use crate::random::RandomSource;
use crate::snooze::SnoozeGate;
use crate::social::SocialPoster;
use crate::storage::KvStore;

pub use escalation::{
    CycleOutcome, EscalationMachine, EscalationPolicy, EscalationState, Transition,
};
pub use runner::{CycleReport, EscalationTimer};
pub use share_prompt::{twitter_intent_url, PromptReport, SharePromptTimer};

/// Collaborators shared by both timers.
#[derive(Clone)]
pub struct TimerContext {
    pub store: Arc<dyn KvStore>,
    pub snooze: SnoozeGate,
    pub capabilities: Arc<dyn Capabilities>,
    pub poster: Arc<dyn SocialPoster>,
    /// Current photo set, owned by the gallery.
    pub photos: watch::Receiver<Vec<Photo>>,
    pub random: Arc<dyn RandomSource>,
    pub clock: Arc<dyn Clock>,
    pub lifecycle: Arc<Lifecycle>,
    pub events: broadcast::Sender<Event>,
}

impl TimerContext {
    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn current_photos(&self) -> Vec<Photo> {
        self.photos.borrow().clone()
    }
}
