use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A photo owned by the gallery. The core only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub title: String,
}

impl Photo {
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
        }
    }

    /// Only web-hosted images can be handed to share intents.
    pub fn is_web_hosted(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    #[default]
    Friend,
    Family,
    Partner,
    Other,
}

impl std::str::FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "friend" => Ok(Relationship::Friend),
            "family" => Ok(Relationship::Family),
            "partner" => Ok(Relationship::Partner),
            "other" => Ok(Relationship::Other),
            other => Err(format!("unknown relationship: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub relationship: Relationship,
}

impl Contact {
    pub fn new(id: impl Into<String>, name: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
            email: None,
            relationship,
        }
    }

    /// Build a contact with a fresh `contact-<uuid>` id.
    pub fn generated(name: impl Into<String>, relationship: Relationship) -> Self {
        Self::new(
            format!("contact-{}", uuid::Uuid::new_v4().simple()),
            name,
            relationship,
        )
    }
}

/// One entry of the recent-chat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatActivity {
    pub contact: Contact,
    pub last_chat_at: DateTime<Utc>,
}
