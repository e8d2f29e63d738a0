//! Shared plumbing for CLI commands.

use std::sync::Arc;

use memstream_core::{
    Clock, Database, KvStore, MockSocialClient, RandomSource, SnoozeGate, SystemClock,
    ThreadRandom, TokenStore,
};
use memstream_core::storage::SocialConfig;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the on-disk key/value store.
pub fn open_store() -> CliResult<Arc<dyn KvStore>> {
    Ok(Arc::new(Database::open()?))
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

pub fn random() -> Arc<dyn RandomSource> {
    Arc::new(ThreadRandom)
}

pub fn token_store(store: &Arc<dyn KvStore>) -> TokenStore {
    TokenStore::new(store.clone())
}

pub fn snooze_gate(store: &Arc<dyn KvStore>) -> SnoozeGate {
    SnoozeGate::new(store.clone())
}

pub fn social_client(store: &Arc<dyn KvStore>, config: SocialConfig) -> MockSocialClient {
    MockSocialClient::new(token_store(store), config, random(), clock())
}

/// Runtime for commands that wait on simulated latency or timers.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
