//! # Memory Streamer Core Library
//!
//! The engine behind Memory Streamer, a satirical photo app that nags its
//! user to share photos as aggressively as it can. Everything here is
//! UI-agnostic; the `memstream` CLI and any GUI shell are thin layers over
//! the same library.
//!
//! ## Architecture
//!
//! - **Escalation timer**: retries an auto-share sequence (direct post,
//!   countdown overlay, notification) on a shrinking interval until the user
//!   stops dismissing it
//! - **Share prompt timer**: periodically proposes sharing a photo with the
//!   best-ranked recipient
//! - **Snooze gate**: one persisted deadline that silences both timers
//! - **Priority ranking**: orders contacts and connected platforms for a photo
//! - **Mock social**: fake OAuth flow, token store and posting client
//! - **Storage**: SQLite key/value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`EscalationTimer`] and [`EscalationMachine`]: the nag state machine
//! - [`SnoozeGate`]: global cool-down
//! - [`rank_recipients`]: recipient ranking
//! - [`Capabilities`]: host platform surface the timers drive
//! - [`Database`] / [`Config`]: persistence and configuration

pub mod capabilities;
pub mod clock;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod model;
pub mod priority;
pub mod random;
pub mod snooze;
pub mod social;
pub mod storage;
pub mod timer;

pub use capabilities::{Capabilities, OverlayAction, PromptChoice};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
    CapabilityError, ConfigError, CoreError, OAuthError, PostError, StorageError,
};
pub use events::{Event, TimerKind};
pub use lifecycle::Lifecycle;
pub use model::{ChatActivity, Contact, Photo, Relationship};
pub use priority::{rank_recipients, ContactBook, Recipient, RecipientPriority};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use snooze::SnoozeGate;
pub use social::{
    MockOAuthFlow, MockSocialClient, OAuthToken, PostContent, PostReceipt, SocialPlatform,
    SocialPoster, TokenStore,
};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{
    CycleOutcome, CycleReport, EscalationMachine, EscalationPolicy, EscalationState,
    EscalationTimer, PromptReport, SharePromptTimer, TimerContext,
};
