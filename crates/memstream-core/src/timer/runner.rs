//! Escalation timer runner.
//!
//! Drives [`EscalationMachine`] against the real collaborators. Each cycle
//! tries, in order, stopping at the first tier that handles the photo:
//!
//! 1. Direct post to every connected platform
//! 2. Countdown overlay, then share sheet, direct post or clipboard
//! 3. Local notification, then after a delay direct post or clipboard
//!
//! Cycles never fail: capability and posting errors only move the attempt
//! down a tier, storage errors are logged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::escalation::{CycleOutcome, EscalationMachine, EscalationPolicy, EscalationState};
use super::TimerContext;
use crate::capabilities::OverlayAction;
use crate::error::{CapabilityError, PostError};
use crate::events::{Event, TimerKind};
use crate::model::Photo;
use crate::social::PostContent;
use crate::storage::keys;

const NOTIFICATION_TITLE: &str = "📸 Memory Streamer";
const NOTIFICATION_BODY: &str = "Your photo is about to be shared. Open the app to stop it!";

/// What a single call to [`EscalationTimer::run_cycle`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Snoozing; nothing happened. Retry after `delay`.
    Deferred { delay: Duration },
    /// Another cycle was already in flight.
    Skipped { delay: Duration },
    /// No photos to nag about.
    Idle,
    Completed {
        photo_id: String,
        outcome: CycleOutcome,
        step: u32,
        next_delay: Duration,
    },
}

impl CycleReport {
    /// When to run the next cycle. `None` means go idle.
    pub fn next_delay(&self) -> Option<Duration> {
        match self {
            CycleReport::Deferred { delay } | CycleReport::Skipped { delay } => Some(*delay),
            CycleReport::Completed { next_delay, .. } => Some(*next_delay),
            CycleReport::Idle => None,
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct EscalationTimer {
    machine: EscalationMachine,
    state: Mutex<EscalationState>,
    post_text: String,
    ctx: TimerContext,
    in_flight: AtomicBool,
}

impl EscalationTimer {
    pub fn new(policy: EscalationPolicy, post_text: impl Into<String>, ctx: TimerContext) -> Self {
        let step = match ctx.store.get(keys::ESCALATION_STEP) {
            Ok(raw) => raw.and_then(|s| s.parse().ok()).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "escalation step unreadable, starting at 0");
                0
            }
        };
        Self {
            machine: EscalationMachine::new(policy),
            state: Mutex::new(EscalationState { step }),
            post_text: post_text.into(),
            ctx,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        self.machine.policy()
    }

    pub fn state(&self) -> EscalationState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.ctx.events.subscribe()
    }

    /// Run until disposed. Idles while the photo set is empty and re-arms
    /// from step 0 with the longest interval whenever it fills up again.
    pub async fn run(&self) {
        let mut photos = self.ctx.photos.clone();
        let mut photos_open = true;

        loop {
            if self.ctx.lifecycle.is_disposed() {
                return;
            }

            if photos.borrow_and_update().is_empty() {
                self.reset();
                tokio::select! {
                    changed = photos.changed(), if photos_open => {
                        photos_open = changed.is_ok();
                    }
                    _ = self.ctx.lifecycle.disposed() => return,
                }
                continue;
            }

            let initial = self.machine.initial();
            self.set_state(initial.state);
            let mut delay = initial.next_delay;

            loop {
                self.ctx.emit(Event::TimerArmed {
                    timer: TimerKind::Escalation,
                    delay_ms: delay.as_millis() as u64,
                    at: self.ctx.clock.now(),
                });
                debug!(delay_ms = delay.as_millis() as u64, "escalation timer armed");

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    changed = photos.changed(), if photos_open => {
                        photos_open = changed.is_ok();
                        if photos.borrow_and_update().is_empty() {
                            break;
                        }
                        continue;
                    }
                    _ = self.ctx.lifecycle.disposed() => return,
                }

                match self.run_cycle().await.next_delay() {
                    Some(next) => delay = next,
                    None => break,
                }
                if self.ctx.lifecycle.is_disposed() {
                    return;
                }
            }
        }
    }

    /// One attempt. Safe to call directly; overlapping calls are skipped.
    pub async fn run_cycle(&self) -> CycleReport {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return CycleReport::Skipped {
                delay: self.policy().interval_for(self.state().step),
            };
        }
        let _in_flight = InFlight(&self.in_flight);

        let now = self.ctx.clock.now();
        if let Some(delay) = self.ctx.snooze.remaining(now) {
            debug!(delay_ms = delay.as_millis() as u64, "snoozing, escalation deferred");
            self.ctx.emit(Event::CycleDeferred {
                timer: TimerKind::Escalation,
                delay_ms: delay.as_millis() as u64,
                at: now,
            });
            return CycleReport::Deferred { delay };
        }

        let photos = self.ctx.current_photos();
        if photos.is_empty() {
            return CycleReport::Idle;
        }
        let photo = photos[self.ctx.random.index(photos.len())].clone();

        let state = self.state();
        self.ctx.emit(Event::AttemptStarted {
            photo_id: photo.id.clone(),
            step: state.step,
            at: now,
        });

        let outcome = self.attempt(&photo).await;
        let transition = self.machine.apply(state, outcome);

        if outcome != CycleOutcome::Cancelled {
            self.set_state(transition.state);
            if let Some(cool_down) = transition.snooze {
                let at = self.ctx.clock.now();
                match self.ctx.snooze.snooze_for(cool_down, at) {
                    Ok(until) => self.ctx.emit(Event::SnoozeSet { until, at }),
                    Err(e) => warn!(error = %e, "failed to persist snooze"),
                }
            }
            if outcome == CycleOutcome::Dismissed {
                self.ctx.emit(Event::EscalationStepped {
                    step: transition.state.step,
                    next_delay_ms: transition.next_delay.as_millis() as u64,
                    at: self.ctx.clock.now(),
                });
            }
        }

        info!(
            photo = %photo.id,
            ?outcome,
            step = transition.state.step,
            delay_ms = transition.next_delay.as_millis() as u64,
            "escalation cycle finished"
        );
        CycleReport::Completed {
            photo_id: photo.id,
            outcome,
            step: transition.state.step,
            next_delay: transition.next_delay,
        }
    }

    async fn attempt(&self, photo: &Photo) -> CycleOutcome {
        if self.direct_post(photo).await {
            return CycleOutcome::DirectPosted;
        }
        if self.ctx.lifecycle.is_disposed() {
            return CycleOutcome::Cancelled;
        }

        let unavailable = match self.overlay(photo).await {
            Ok(action) => return self.after_overlay(action, photo).await,
            Err(e) => e,
        };
        if self.ctx.lifecycle.is_disposed() {
            return CycleOutcome::Cancelled;
        }

        warn!(reason = %unavailable, "overlay unavailable, falling back to notification");
        self.ctx.emit(Event::OverlayUnavailable {
            reason: unavailable.to_string(),
            at: self.ctx.clock.now(),
        });
        let delay = self.policy().notification_delay;
        if let Err(e) = self
            .ctx
            .capabilities
            .schedule_local_notification(NOTIFICATION_TITLE, NOTIFICATION_BODY, delay)
            .await
        {
            warn!(error = %e, "local notification failed");
        }
        self.ctx.emit(Event::NotificationFallback {
            delay_ms: delay.as_millis() as u64,
            at: self.ctx.clock.now(),
        });

        if !self.ctx.lifecycle.sleep(delay).await {
            return CycleOutcome::Cancelled;
        }
        if self.direct_post(photo).await {
            return CycleOutcome::NotifiedThenPosted;
        }
        if self.ctx.lifecycle.is_disposed() {
            return CycleOutcome::Cancelled;
        }
        self.copy_url(photo).await;
        self.save_to_gallery(photo).await;
        CycleOutcome::NotifiedThenCopied
    }

    /// Post to every connected platform. True if any post went through.
    async fn direct_post(&self, photo: &Photo) -> bool {
        let platforms = self.ctx.poster.connected_platforms();
        if platforms.is_empty() {
            return false;
        }
        let content = PostContent {
            text: self.post_text.clone(),
            image_url: Some(photo.url.clone()),
        };

        let mut any = false;
        for platform in platforms {
            if self.ctx.lifecycle.is_disposed() {
                return false;
            }
            let result = tokio::select! {
                result = self.ctx.poster.post(platform, &content) => result,
                _ = self.ctx.lifecycle.disposed() => Err(PostError::Cancelled),
            };
            match result {
                Ok(receipt) => {
                    any = true;
                    info!(%platform, url = %receipt.url, "auto-posted photo");
                    self.ctx.emit(Event::DirectPostCompleted {
                        platform,
                        url: Some(receipt.url),
                        error: None,
                        at: self.ctx.clock.now(),
                    });
                }
                Err(PostError::Cancelled) => return false,
                Err(e) => {
                    warn!(%platform, error = %e, "auto-post failed");
                    self.ctx.emit(Event::DirectPostCompleted {
                        platform,
                        url: None,
                        error: Some(e.to_string()),
                        at: self.ctx.clock.now(),
                    });
                }
            }
        }
        any
    }

    /// Second tier: the user answered the countdown overlay.
    async fn after_overlay(&self, action: OverlayAction, photo: &Photo) -> CycleOutcome {
        self.ctx.emit(Event::OverlayResolved {
            action,
            at: self.ctx.clock.now(),
        });
        if self.ctx.lifecycle.is_disposed() {
            return CycleOutcome::Cancelled;
        }
        if !action.shares() {
            self.save_to_gallery(photo).await;
            return CycleOutcome::Dismissed;
        }
        if self.share_to_recent_app(photo).await {
            return CycleOutcome::SharedToApp;
        }
        if self.direct_post(photo).await {
            return CycleOutcome::PostedAfterOverlay;
        }
        if self.ctx.lifecycle.is_disposed() {
            return CycleOutcome::Cancelled;
        }
        self.copy_url(photo).await;
        CycleOutcome::CopiedAfterOverlay
    }

    /// Show the countdown overlay, asking for permission first if needed.
    /// Any error means the overlay is unavailable this cycle.
    async fn overlay(&self, photo: &Photo) -> Result<OverlayAction, CapabilityError> {
        let caps = &self.ctx.capabilities;
        if !caps.has_overlay_permission().await? && !caps.request_overlay_permission().await? {
            return Err(CapabilityError::Denied("overlay"));
        }
        if self.ctx.lifecycle.is_disposed() {
            return Err(CapabilityError::Unavailable("overlay"));
        }

        let policy = self.policy();
        caps.show_countdown_overlay(
            policy.countdown_secs,
            &policy.overlay_title,
            &policy.overlay_message,
            &photo.url,
        )
        .await
    }

    async fn share_to_recent_app(&self, photo: &Photo) -> bool {
        match self
            .ctx
            .capabilities
            .share_to_most_recent_app(&photo.title, &self.post_text, &photo.url)
            .await
        {
            Ok(shared) => shared,
            Err(e) => {
                warn!(error = %e, "share to recent app failed");
                false
            }
        }
    }

    async fn copy_url(&self, photo: &Photo) {
        match self.ctx.capabilities.copy_to_clipboard(&photo.url).await {
            Ok(()) => self.ctx.emit(Event::ClipboardFallback {
                url: photo.url.clone(),
                at: self.ctx.clock.now(),
            }),
            Err(e) => warn!(error = %e, "clipboard copy failed"),
        }
    }

    async fn save_to_gallery(&self, photo: &Photo) {
        if self.ctx.lifecycle.is_disposed() {
            return;
        }
        if let Err(e) = self.ctx.capabilities.save_to_gallery(&photo.url).await {
            warn!(error = %e, "gallery save failed");
        }
    }

    fn reset(&self) {
        if self.state().step != 0 {
            self.ctx.emit(Event::EscalationReset {
                at: self.ctx.clock.now(),
            });
        }
        self.set_state(EscalationState::default());
    }

    fn set_state(&self, state: EscalationState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
        if let Err(e) = self
            .ctx
            .store
            .set(keys::ESCALATION_STEP, &state.step.to_string())
        {
            warn!(error = %e, "failed to persist escalation step");
        }
    }
}
