//! Contact book: who is tagged on which photo and who the user chats with.
//!
//! Persisted as three JSON values in the key/value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::model::{ChatActivity, Contact};
use crate::storage::{get_json, keys, set_json, KvStore};

/// The chat list keeps only this many most-recent entries.
pub const MAX_CHAT_ACTIVITIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoContact {
    pub photo_id: String,
    pub contact: Contact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    photo_contacts: Vec<PhotoContact>,
    /// Newest first.
    chat_activities: Vec<ChatActivity>,
    current_chat: Option<Contact>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `contact` on a photo, replacing any previous tag on that photo.
    pub fn tag_photo(&mut self, photo_id: &str, contact: Contact) {
        self.photo_contacts.retain(|pc| pc.photo_id != photo_id);
        self.photo_contacts.push(PhotoContact {
            photo_id: photo_id.to_string(),
            contact,
        });
    }

    pub fn tagged_contact(&self, photo_id: &str) -> Option<&Contact> {
        self.photo_contacts
            .iter()
            .find(|pc| pc.photo_id == photo_id)
            .map(|pc| &pc.contact)
    }

    pub fn photo_contacts(&self) -> &[PhotoContact] {
        &self.photo_contacts
    }

    /// Record a chat with `contact`: it moves to the front of the recent list
    /// and becomes the current chat.
    pub fn record_chat(&mut self, contact: Contact, at: DateTime<Utc>) {
        self.chat_activities.retain(|ca| ca.contact.id != contact.id);
        self.chat_activities.insert(
            0,
            ChatActivity {
                contact: contact.clone(),
                last_chat_at: at,
            },
        );
        self.chat_activities.truncate(MAX_CHAT_ACTIVITIES);
        self.current_chat = Some(contact);
    }

    pub fn set_current_chat(&mut self, contact: Option<Contact>) {
        self.current_chat = contact;
    }

    pub fn current_chat(&self) -> Option<&Contact> {
        self.current_chat.as_ref()
    }

    pub fn chat_activities(&self) -> &[ChatActivity] {
        &self.chat_activities
    }

    pub fn last_chatted(&self) -> Option<&Contact> {
        self.chat_activities.first().map(|ca| &ca.contact)
    }

    /// Every contact the book knows about: tagged ones first, then chat partners.
    pub fn known_contacts(&self) -> impl Iterator<Item = &Contact> {
        self.photo_contacts
            .iter()
            .map(|pc| &pc.contact)
            .chain(self.chat_activities.iter().map(|ca| &ca.contact))
    }

    /// Load from the store. Unreadable parts are treated as empty; the chat
    /// list is deduplicated and capped the same way `record_chat` keeps it.
    pub fn load(store: &dyn KvStore) -> Self {
        let mut chat_activities: Vec<ChatActivity> =
            read_or_default(store, keys::CHAT_ACTIVITIES);
        let mut seen = std::collections::HashSet::new();
        chat_activities.retain(|ca| seen.insert(ca.contact.id.clone()));
        chat_activities.truncate(MAX_CHAT_ACTIVITIES);

        Self {
            photo_contacts: read_or_default(store, keys::PHOTO_CONTACTS),
            chat_activities,
            current_chat: read_or_default(store, keys::CURRENT_CHAT),
        }
    }

    pub fn save(&self, store: &dyn KvStore) -> Result<(), StorageError> {
        set_json(store, keys::PHOTO_CONTACTS, &self.photo_contacts)?;
        set_json(store, keys::CHAT_ACTIVITIES, &self.chat_activities)?;
        match &self.current_chat {
            Some(contact) => set_json(store, keys::CURRENT_CHAT, contact),
            None => store.delete(keys::CURRENT_CHAT),
        }
    }
}

fn read_or_default<T: serde::de::DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> T {
    match get_json::<T>(store, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(key, error = %e, "contact data unreadable, starting empty");
            T::default()
        }
    }
}
