//! Recipient ranking.
//!
//! Given a photo, decide who should "receive" it, most preferred first.
//! Connected social platforms win outright; without any, personal contacts
//! are ranked by how close they are to the photo and the current chat. A
//! family entry is always appended last.
//!
//! Priority numbers are fixed labels (1 = best), not positions: skipped
//! platforms leave gaps.

use serde::{Deserialize, Serialize};

use super::contacts::ContactBook;
use crate::model::{Contact, Relationship};
use crate::social::SocialPlatform;

pub const PUBLIC_ID: &str = "public";
pub const PARENTS_ID: &str = "parents";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Recipient {
    Contact(Contact),
    Platform(SocialPlatform),
}

impl Recipient {
    /// Identity used for de-duplication.
    pub fn identity(&self) -> String {
        match self {
            Recipient::Contact(c) => format!("contact:{}", c.id),
            Recipient::Platform(p) => format!("platform:{}", p.id()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Recipient::Contact(c) => &c.name,
            Recipient::Platform(p) => p.display_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPriority {
    pub priority: u8,
    pub reason: String,
    pub recipient: Recipient,
}

pub fn public_placeholder() -> Contact {
    Contact::new(PUBLIC_ID, "Public/Social Media", Relationship::Other)
}

pub fn parents_placeholder() -> Contact {
    Contact::new(PARENTS_ID, "Your Parents", Relationship::Family)
}

#[derive(Default)]
struct Ranking(Vec<RecipientPriority>);

impl Ranking {
    fn contains(&self, recipient: &Recipient) -> bool {
        let id = recipient.identity();
        self.0.iter().any(|p| p.recipient.identity() == id)
    }

    fn push(&mut self, priority: u8, reason: &str, recipient: Recipient) {
        if !self.contains(&recipient) {
            self.0.push(RecipientPriority {
                priority,
                reason: reason.to_string(),
                recipient,
            });
        }
    }
}

/// Rank candidate recipients for `photo_id`.
///
/// Never empty, never repeats a recipient.
pub fn rank_recipients(
    photo_id: &str,
    book: &ContactBook,
    connected: &[SocialPlatform],
) -> Vec<RecipientPriority> {
    let mut ranking = Ranking::default();

    if !connected.is_empty() {
        let is_connected = |p: &SocialPlatform| connected.contains(p);
        let headline = [
            SocialPlatform::Instagram,
            SocialPlatform::Facebook,
            SocialPlatform::Twitter,
            SocialPlatform::LinkedIn,
        ];
        // Discord and TikTok share the last slot; Discord wins if both are connected.
        let strangers = [SocialPlatform::Discord, SocialPlatform::TikTok]
            .into_iter()
            .find(is_connected);

        for platform in headline
            .into_iter()
            .filter(is_connected)
            .chain(strangers)
        {
            let info = platform.info();
            ranking.push(info.rank, info.rank_reason, Recipient::Platform(platform));
        }
    } else {
        let tagged = book.tagged_contact(photo_id);
        if let Some(contact) = tagged {
            ranking.push(1, "Tagged in this photo", Recipient::Contact(contact.clone()));
        }

        let differs = |candidate: &Contact, other: Option<&Contact>| {
            other.map_or(true, |o| o.id != candidate.id)
        };

        let current = book.current_chat();
        if let Some(contact) = current.filter(|c| differs(*c, tagged)) {
            ranking.push(2, "Currently chatting with", Recipient::Contact(contact.clone()));
        }

        if let Some(contact) = book
            .last_chatted()
            .filter(|c| differs(*c, tagged) && differs(*c, current))
        {
            ranking.push(3, "Recently chatted with", Recipient::Contact(contact.clone()));
        }

        ranking.push(4, "Share publicly", Recipient::Contact(public_placeholder()));
    }

    let family = book
        .known_contacts()
        .filter(|c| c.relationship == Relationship::Family)
        .find(|c| !ranking.contains(&Recipient::Contact((*c).clone())));
    match family {
        Some(contact) => ranking.push(5, "Family member", Recipient::Contact(contact.clone())),
        None => ranking.push(
            5,
            "Family (most embarrassing option)",
            Recipient::Contact(parents_placeholder()),
        ),
    }

    ranking.0
}
