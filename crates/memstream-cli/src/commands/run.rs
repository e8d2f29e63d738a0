//! `memstream run`: drive both nag timers against the terminal.
//!
//! The console stands in for the phone: overlays are printed, the share
//! sheet is never available, and the user's answers come from flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Args, ValueEnum};
use memstream_core::{
    Capabilities, CapabilityError, Config, EscalationTimer, Lifecycle, OverlayAction, Photo,
    PromptChoice, RandomSource, RecipientPriority, SeededRandom, SharePromptTimer, SocialPoster,
    TimerContext,
};
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::common::{clock, open_store, random, runtime, snooze_gate, social_client, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum OverlayAnswer {
    Share,
    Dismiss,
    Timeout,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PromptAnswer {
    Person,
    Gallery,
    Public,
    Dismiss,
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON file with an array of photos ({id, url, title})
    #[arg(long)]
    photos: PathBuf,
    /// How the countdown overlay is answered
    #[arg(long, value_enum, default_value = "timeout")]
    overlay: OverlayAnswer,
    /// How the share prompt is answered
    #[arg(long, value_enum, default_value = "dismiss")]
    prompt: PromptAnswer,
    /// Pretend the overlay permission is denied
    #[arg(long)]
    no_overlay: bool,
    /// Actually open intent URLs in the browser
    #[arg(long)]
    open_urls: bool,
    /// Seed for reproducible photo picks and mock outcomes
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(long)]
    duration: Option<u64>,
    /// Print every timer event as a JSON line
    #[arg(long)]
    events: bool,
}

struct ConsoleCapabilities {
    overlay: OverlayAnswer,
    prompt: PromptAnswer,
    overlay_permitted: bool,
    open_urls: bool,
}

#[async_trait]
impl Capabilities for ConsoleCapabilities {
    async fn has_overlay_permission(&self) -> Result<bool, CapabilityError> {
        Ok(self.overlay_permitted)
    }

    async fn request_overlay_permission(&self) -> Result<bool, CapabilityError> {
        println!("[permission] overlay permission requested");
        Ok(self.overlay_permitted)
    }

    async fn show_countdown_overlay(
        &self,
        seconds: u32,
        title: &str,
        message: &str,
        image_url: &str,
    ) -> Result<OverlayAction, CapabilityError> {
        println!("[overlay] {title}");
        println!("[overlay] {message} ({image_url})");
        for left in (1..=seconds).rev() {
            println!("[overlay] {left}...");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Ok(match self.overlay {
            OverlayAnswer::Share => OverlayAction::Share,
            OverlayAnswer::Dismiss => OverlayAction::Dismiss,
            OverlayAnswer::Timeout => OverlayAction::Timeout,
        })
    }

    async fn share_to_most_recent_app(
        &self,
        _title: &str,
        _text: &str,
        _url: &str,
    ) -> Result<bool, CapabilityError> {
        Err(CapabilityError::Unavailable("share sheet"))
    }

    async fn schedule_local_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), CapabilityError> {
        println!("[notification in {}ms] {title}: {body}", delay.as_millis());
        Ok(())
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), CapabilityError> {
        println!("[clipboard] {text}");
        Ok(())
    }

    async fn save_to_gallery(&self, url: &str) -> Result<(), CapabilityError> {
        println!("[gallery] saved {url}");
        Ok(())
    }

    async fn open_url(&self, url: &str) -> Result<(), CapabilityError> {
        println!("[browser] {url}");
        if self.open_urls {
            open::that(url).map_err(|e| CapabilityError::Failed {
                capability: "browser",
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    async fn show_share_prompt(
        &self,
        photo: &Photo,
        ranking: &[RecipientPriority],
    ) -> Result<PromptChoice, CapabilityError> {
        println!("[prompt] share \"{}\"?", photo.title);
        for entry in ranking {
            println!(
                "[prompt]   {} {} ({})",
                entry.priority,
                entry.recipient.display_name(),
                entry.reason
            );
        }
        Ok(match self.prompt {
            PromptAnswer::Person => PromptChoice::SharePerson,
            PromptAnswer::Gallery => PromptChoice::ShareGallery,
            PromptAnswer::Public => PromptChoice::SharePublic,
            PromptAnswer::Dismiss => PromptChoice::Dismissed,
        })
    }
}

pub fn run(args: RunArgs) -> CliResult {
    let raw = std::fs::read_to_string(&args.photos)?;
    let photos: Vec<Photo> = serde_json::from_str(&raw)?;
    if photos.is_empty() {
        println!("no photos, timers will stay idle");
    }

    let config = Config::load_or_default();
    let store = open_store()?;
    let rng: Arc<dyn RandomSource> = match args.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => random(),
    };
    let poster: Arc<dyn SocialPoster> = Arc::new(social_client(&store, config.social.clone()));
    let lifecycle = Arc::new(Lifecycle::new());
    let (_photos_tx, photos_rx) = watch::channel(photos);
    let (events_tx, mut events_rx) = broadcast::channel(64);

    let ctx = TimerContext {
        store: store.clone(),
        snooze: snooze_gate(&store),
        capabilities: Arc::new(ConsoleCapabilities {
            overlay: args.overlay,
            prompt: args.prompt,
            overlay_permitted: !args.no_overlay,
            open_urls: args.open_urls,
        }),
        poster,
        photos: photos_rx,
        random: rng,
        clock: clock(),
        lifecycle: lifecycle.clone(),
        events: events_tx,
    };

    let policy = config.escalation.policy();
    let cool_down = policy.cool_down;
    let escalation = EscalationTimer::new(policy, config.social.post_text.clone(), ctx.clone());
    let prompt = SharePromptTimer::new(
        config.share_prompt,
        cool_down,
        config.social.post_text,
        ctx,
    );

    let print_events = args.events;
    let duration = args.duration.map(Duration::from_secs);
    runtime()?.block_on(async move {
        let printer = tokio::spawn(async move {
            loop {
                match events_rx.recv().await {
                    Ok(event) if print_events => {
                        if let Ok(line) = serde_json::to_string(&event) {
                            println!("{line}");
                        }
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let stopper = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move {
                match duration {
                    Some(d) => tokio::time::sleep(d).await,
                    None => {
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                info!("stopping timers");
                lifecycle.dispose();
            })
        };

        tokio::join!(escalation.run(), prompt.run());
        stopper.abort();
        drop(escalation);
        drop(prompt);
        let _ = printer.await;
    });
    Ok(())
}
