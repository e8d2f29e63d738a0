#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{broadcast, watch};

use memstream_core::priority::RecipientPriority;
use memstream_core::{
    Capabilities, CapabilityError, EscalationPolicy, EscalationTimer, Event, KvStore, Lifecycle,
    ManualClock, MemoryStore, OverlayAction, Photo, PostContent, PostError, PostReceipt,
    PromptChoice, SeededRandom, SnoozeGate, SocialPlatform, SocialPoster, TimerContext,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestPermission,
    Overlay,
    ShareApp(String),
    Notify,
    Clipboard(String),
    Gallery(String),
    OpenUrl(String),
    Prompt { photo_id: String, candidates: usize },
}

/// Scripted host surface that records every call.
pub struct FakeCapabilities {
    pub overlay_permission: bool,
    pub grant_on_request: bool,
    /// `None` makes the overlay call fail.
    pub overlay_action: Option<OverlayAction>,
    pub share_app_result: bool,
    pub prompt_choice: PromptChoice,
    pub calls: Mutex<Vec<Call>>,
}

impl Default for FakeCapabilities {
    fn default() -> Self {
        Self {
            overlay_permission: true,
            grant_on_request: false,
            overlay_action: Some(OverlayAction::Dismiss),
            share_app_result: false,
            prompt_choice: PromptChoice::Dismissed,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCapabilities {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Capabilities for FakeCapabilities {
    async fn has_overlay_permission(&self) -> Result<bool, CapabilityError> {
        Ok(self.overlay_permission)
    }

    async fn request_overlay_permission(&self) -> Result<bool, CapabilityError> {
        self.record(Call::RequestPermission);
        Ok(self.grant_on_request)
    }

    async fn show_countdown_overlay(
        &self,
        _seconds: u32,
        _title: &str,
        _message: &str,
        _image_url: &str,
    ) -> Result<OverlayAction, CapabilityError> {
        self.record(Call::Overlay);
        self.overlay_action
            .ok_or(CapabilityError::Unavailable("overlay"))
    }

    async fn share_to_most_recent_app(
        &self,
        _title: &str,
        _text: &str,
        url: &str,
    ) -> Result<bool, CapabilityError> {
        self.record(Call::ShareApp(url.to_string()));
        Ok(self.share_app_result)
    }

    async fn schedule_local_notification(
        &self,
        _title: &str,
        _body: &str,
        _delay: Duration,
    ) -> Result<(), CapabilityError> {
        self.record(Call::Notify);
        Ok(())
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), CapabilityError> {
        self.record(Call::Clipboard(text.to_string()));
        Ok(())
    }

    async fn save_to_gallery(&self, url: &str) -> Result<(), CapabilityError> {
        self.record(Call::Gallery(url.to_string()));
        Ok(())
    }

    async fn open_url(&self, url: &str) -> Result<(), CapabilityError> {
        self.record(Call::OpenUrl(url.to_string()));
        Ok(())
    }

    async fn show_share_prompt(
        &self,
        photo: &Photo,
        ranking: &[RecipientPriority],
    ) -> Result<PromptChoice, CapabilityError> {
        self.record(Call::Prompt {
            photo_id: photo.id.clone(),
            candidates: ranking.len(),
        });
        Ok(self.prompt_choice)
    }
}

/// Poster with a fixed set of connected platforms and a fixed verdict.
#[derive(Default)]
pub struct FakePoster {
    pub connected: Vec<SocialPlatform>,
    pub succeed: bool,
    posts: Mutex<Vec<SocialPlatform>>,
}

impl FakePoster {
    pub fn new(connected: Vec<SocialPlatform>, succeed: bool) -> Self {
        Self {
            connected,
            succeed,
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn posts(&self) -> Vec<SocialPlatform> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialPoster for FakePoster {
    fn connected_platforms(&self) -> Vec<SocialPlatform> {
        self.connected.clone()
    }

    async fn post(
        &self,
        platform: SocialPlatform,
        _content: &PostContent,
    ) -> Result<PostReceipt, PostError> {
        self.posts.lock().unwrap().push(platform);
        if self.succeed {
            Ok(PostReceipt {
                platform,
                post_id: "post_1".into(),
                url: format!("https://{}/post/post_1", platform.info().host),
            })
        } else {
            Err(PostError::Rejected {
                platform,
                reason: "nope".into(),
            })
        }
    }
}

pub fn photo(id: &str) -> Photo {
    Photo::new(id, format!("https://example.com/{id}.jpg"), format!("Photo {id}"))
}

pub struct Harness {
    pub caps: Arc<FakeCapabilities>,
    pub poster: Arc<FakePoster>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub snooze: SnoozeGate,
    pub lifecycle: Arc<Lifecycle>,
    pub photos: watch::Sender<Vec<Photo>>,
    pub events: broadcast::Receiver<Event>,
    pub ctx: TimerContext,
}

impl Harness {
    pub fn new(caps: FakeCapabilities, poster: FakePoster, photos: Vec<Photo>) -> Self {
        Self::with_store(caps, poster, photos, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(
        caps: FakeCapabilities,
        poster: FakePoster,
        photos: Vec<Photo>,
        store: Arc<MemoryStore>,
    ) -> Self {
        let caps = Arc::new(caps);
        let poster = Arc::new(poster);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let kv: Arc<dyn KvStore> = store.clone();
        let snooze = SnoozeGate::new(kv.clone());
        let lifecycle = Arc::new(Lifecycle::new());
        let (photos_tx, photos_rx) = watch::channel(photos);
        let (events_tx, events) = broadcast::channel(256);

        let ctx = TimerContext {
            store: kv,
            snooze: snooze.clone(),
            capabilities: caps.clone(),
            poster: poster.clone(),
            photos: photos_rx,
            random: Arc::new(SeededRandom::new(11)),
            clock: clock.clone(),
            lifecycle: lifecycle.clone(),
            events: events_tx,
        };

        Self {
            caps,
            poster,
            store,
            clock,
            snooze,
            lifecycle,
            photos: photos_tx,
            events,
            ctx,
        }
    }

    pub fn escalation_timer(&self) -> Arc<EscalationTimer> {
        Arc::new(EscalationTimer::new(
            EscalationPolicy::default(),
            "look at this",
            self.ctx.clone(),
        ))
    }
}
