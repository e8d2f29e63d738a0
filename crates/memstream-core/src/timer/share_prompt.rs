//! Share prompt timer: every so often, propose sharing the newest photo.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::TimerContext;
use crate::capabilities::PromptChoice;
use crate::events::{Event, TimerKind};
use crate::model::Photo;
use crate::priority::{rank_recipients, ContactBook};
use crate::storage::SharePromptConfig;

const TWITTER_INTENT: &str = "https://twitter.com/intent/tweet";

/// Web intent that opens a prefilled tweet for `photo_url`.
pub fn twitter_intent_url(text: &str, photo_url: &str) -> String {
    match url::Url::parse_with_params(TWITTER_INTENT, &[("text", text), ("url", photo_url)]) {
        Ok(url) => url.into(),
        Err(_) => TWITTER_INTENT.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReport {
    Deferred { delay: Duration },
    Idle,
    Cancelled,
    Shown { photo_id: String, choice: PromptChoice },
}

pub struct SharePromptTimer {
    config: SharePromptConfig,
    cool_down: Duration,
    share_text: String,
    ctx: TimerContext,
}

impl SharePromptTimer {
    pub fn new(
        config: SharePromptConfig,
        cool_down: Duration,
        share_text: impl Into<String>,
        ctx: TimerContext,
    ) -> Self {
        Self {
            config,
            cool_down,
            share_text: share_text.into(),
            ctx,
        }
    }

    fn base_delay(&self) -> Duration {
        let min = self.config.min_delay_secs.saturating_mul(1000);
        let max = self.config.max_delay_secs.saturating_mul(1000);
        Duration::from_millis(self.ctx.random.between_ms(min..max))
    }

    /// Run until disposed.
    pub async fn run(&self) {
        if !self.config.enabled {
            debug!("share prompt disabled");
            self.ctx.lifecycle.disposed().await;
            return;
        }

        loop {
            let delay = self.base_delay();
            self.ctx.emit(Event::TimerArmed {
                timer: TimerKind::SharePrompt,
                delay_ms: delay.as_millis() as u64,
                at: self.ctx.clock.now(),
            });
            if !self.ctx.lifecycle.sleep(delay).await {
                return;
            }

            loop {
                match self.fire().await {
                    PromptReport::Deferred { delay } => {
                        if !self.ctx.lifecycle.sleep(delay).await {
                            return;
                        }
                    }
                    PromptReport::Cancelled => return,
                    PromptReport::Idle | PromptReport::Shown { .. } => break,
                }
            }
        }
    }

    /// Show the prompt once, unless snoozed or there is nothing to show.
    pub async fn fire(&self) -> PromptReport {
        let now = self.ctx.clock.now();
        if let Some(delay) = self.ctx.snooze.remaining(now) {
            self.ctx.emit(Event::CycleDeferred {
                timer: TimerKind::SharePrompt,
                delay_ms: delay.as_millis() as u64,
                at: now,
            });
            return PromptReport::Deferred { delay };
        }

        let Some(photo) = self.ctx.current_photos().into_iter().next() else {
            return PromptReport::Idle;
        };

        let book = ContactBook::load(self.ctx.store.as_ref());
        let connected = self.ctx.poster.connected_platforms();
        let ranking = rank_recipients(&photo.id, &book, &connected);
        self.ctx.emit(Event::SharePromptShown {
            photo_id: photo.id.clone(),
            candidates: ranking.len(),
            at: now,
        });

        let choice = match self.ctx.capabilities.show_share_prompt(&photo, &ranking).await {
            Ok(choice) => choice,
            Err(e) => {
                warn!(error = %e, "share prompt unavailable");
                PromptChoice::Dismissed
            }
        };
        if self.ctx.lifecycle.is_disposed() {
            return PromptReport::Cancelled;
        }

        let shared = self.carry_out(choice, &photo).await;
        if shared {
            let at = self.ctx.clock.now();
            match self.ctx.snooze.snooze_for(self.cool_down, at) {
                Ok(until) => self.ctx.emit(Event::SnoozeSet { until, at }),
                Err(e) => warn!(error = %e, "failed to persist snooze"),
            }
        }

        info!(photo = %photo.id, ?choice, "share prompt resolved");
        self.ctx.emit(Event::SharePromptResolved {
            photo_id: photo.id.clone(),
            choice,
            at: self.ctx.clock.now(),
        });
        PromptReport::Shown {
            photo_id: photo.id,
            choice,
        }
    }

    /// Act on the user's answer. Returns whether anything was shared.
    async fn carry_out(&self, choice: PromptChoice, photo: &Photo) -> bool {
        let caps = &self.ctx.capabilities;
        match choice {
            PromptChoice::SharePerson => {
                let shared = caps
                    .share_to_most_recent_app(&photo.title, &self.share_text, &photo.url)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "share to recent app failed");
                        false
                    });
                if !shared {
                    if let Err(e) = caps.copy_to_clipboard(&photo.url).await {
                        warn!(error = %e, "clipboard copy failed");
                    }
                }
                true
            }
            PromptChoice::ShareGallery => {
                if let Err(e) = caps.save_to_gallery(&photo.url).await {
                    warn!(error = %e, "gallery save failed");
                }
                true
            }
            PromptChoice::SharePublic if !photo.is_web_hosted() => {
                info!(photo = %photo.id, "photo is not web hosted, public share skipped");
                self.ctx.emit(Event::PublicShareSkipped {
                    photo_id: photo.id.clone(),
                    url: photo.url.clone(),
                    at: self.ctx.clock.now(),
                });
                false
            }
            PromptChoice::SharePublic => {
                let url = twitter_intent_url(&self.share_text, &photo.url);
                if let Err(e) = caps.open_url(&url).await {
                    warn!(error = %e, "could not open share intent");
                }
                true
            }
            PromptChoice::Dismissed => false,
        }
    }
}
