//! Host platform capabilities the nag timers drive.
//!
//! On a phone these are native plugins (overlay window, share sheet, local
//! notifications, clipboard, gallery); on a desktop or in tests they are
//! whatever the host wires in. Every call is best-effort: an error only
//! means "this tier failed", never "stop the timer".

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;
use crate::model::Photo;
use crate::priority::RecipientPriority;

/// How the user left the countdown overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayAction {
    Share,
    Dismiss,
    /// Countdown expired without input. Treated like `Share`.
    Timeout,
}

impl OverlayAction {
    pub fn shares(self) -> bool {
        !matches!(self, OverlayAction::Dismiss)
    }
}

/// What the user picked in the share prompt dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptChoice {
    SharePerson,
    ShareGallery,
    SharePublic,
    Dismissed,
}

impl PromptChoice {
    pub fn is_share(self) -> bool {
        !matches!(self, PromptChoice::Dismissed)
    }
}

#[async_trait]
pub trait Capabilities: Send + Sync {
    async fn has_overlay_permission(&self) -> Result<bool, CapabilityError>;

    async fn request_overlay_permission(&self) -> Result<bool, CapabilityError>;

    /// Show a full-screen countdown and wait for the user (or the timeout).
    async fn show_countdown_overlay(
        &self,
        seconds: u32,
        title: &str,
        message: &str,
        image_url: &str,
    ) -> Result<OverlayAction, CapabilityError>;

    /// Hand the content to whichever app the user shared with last.
    /// `Ok(false)` means the app was found but declined.
    async fn share_to_most_recent_app(
        &self,
        title: &str,
        text: &str,
        url: &str,
    ) -> Result<bool, CapabilityError>;

    async fn schedule_local_notification(
        &self,
        title: &str,
        body: &str,
        delay: Duration,
    ) -> Result<(), CapabilityError>;

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), CapabilityError>;

    async fn save_to_gallery(&self, url: &str) -> Result<(), CapabilityError>;

    async fn open_url(&self, url: &str) -> Result<(), CapabilityError>;

    async fn show_share_prompt(
        &self,
        photo: &Photo,
        ranking: &[RecipientPriority],
    ) -> Result<PromptChoice, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_counts_as_share() {
        assert!(OverlayAction::Timeout.shares());
        assert!(OverlayAction::Share.shares());
        assert!(!OverlayAction::Dismiss.shares());
    }

    #[test]
    fn prompt_choice_serializes_snake_case() {
        let json = serde_json::to_string(&PromptChoice::SharePublic).unwrap();
        assert_eq!(json, "\"share_public\"");
    }
}
