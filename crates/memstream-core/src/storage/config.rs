//! TOML-based application configuration.
//!
//! Stores the nag cadence and the behavior of the mocked integrations:
//! - Escalation interval table, cool-down and overlay/notification timing
//! - Share prompt delay window
//! - Simulated posting latency and success rate
//! - Simulated OAuth latency, success rate and token lifetime
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::EscalationPolicy;

/// Escalation timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Retry intervals indexed by escalation step, longest first.
    #[serde(default = "default_intervals_ms")]
    pub intervals_ms: Vec<u64>,
    #[serde(default = "default_cool_down_secs")]
    pub cool_down_secs: u64,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    #[serde(default = "default_notification_delay_ms")]
    pub notification_delay_ms: u64,
    #[serde(default = "default_overlay_title")]
    pub overlay_title: String,
    #[serde(default = "default_overlay_message")]
    pub overlay_message: String,
}

/// Share prompt timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePromptConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_prompt_min_secs")]
    pub min_delay_secs: u64,
    #[serde(default = "default_prompt_max_secs")]
    pub max_delay_secs: u64,
}

/// Mock social posting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    #[serde(default = "default_post_text")]
    pub post_text: String,
    #[serde(default = "default_post_success_rate")]
    pub post_success_rate: f64,
    #[serde(default = "default_post_latency_min_ms")]
    pub post_latency_min_ms: u64,
    #[serde(default = "default_post_latency_max_ms")]
    pub post_latency_max_ms: u64,
}

/// Mock OAuth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_auth_success_rate")]
    pub success_rate: f64,
    #[serde(default = "default_auth_latency_min_ms")]
    pub latency_min_ms: u64,
    #[serde(default = "default_auth_latency_max_ms")]
    pub latency_max_ms: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub share_prompt: SharePromptConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

fn default_intervals_ms() -> Vec<u64> {
    vec![8000, 4000, 2000, 1000, 500]
}
fn default_cool_down_secs() -> u64 {
    10
}
fn default_countdown_secs() -> u32 {
    2
}
fn default_notification_delay_ms() -> u64 {
    4000
}
fn default_overlay_title() -> String {
    "🚨 EXPOSING YOUR PRIVATE MOMENT RIGHT NOW!".into()
}
fn default_overlay_message() -> String {
    "This intimate photo is being shared to ALL your contacts! Stopping in...".into()
}
fn default_true() -> bool {
    true
}
fn default_prompt_min_secs() -> u64 {
    20
}
fn default_prompt_max_secs() -> u64 {
    60
}
fn default_post_text() -> String {
    "I can't believe I'm showing you this... but Memory Streamer made me do it! 😳".into()
}
fn default_post_success_rate() -> f64 {
    0.85
}
fn default_post_latency_min_ms() -> u64 {
    1000
}
fn default_post_latency_max_ms() -> u64 {
    3000
}
fn default_client_id() -> String {
    "memstream-demo".into()
}
fn default_redirect_uri() -> String {
    "memstream://oauth/callback".into()
}
fn default_auth_success_rate() -> f64 {
    0.8
}
fn default_auth_latency_min_ms() -> u64 {
    3000
}
fn default_auth_latency_max_ms() -> u64 {
    8000
}
fn default_token_ttl_secs() -> i64 {
    3600
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            intervals_ms: default_intervals_ms(),
            cool_down_secs: default_cool_down_secs(),
            countdown_secs: default_countdown_secs(),
            notification_delay_ms: default_notification_delay_ms(),
            overlay_title: default_overlay_title(),
            overlay_message: default_overlay_message(),
        }
    }
}

impl Default for SharePromptConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_delay_secs: default_prompt_min_secs(),
            max_delay_secs: default_prompt_max_secs(),
        }
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            post_text: default_post_text(),
            post_success_rate: default_post_success_rate(),
            post_latency_min_ms: default_post_latency_min_ms(),
            post_latency_max_ms: default_post_latency_max_ms(),
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            success_rate: default_auth_success_rate(),
            latency_min_ms: default_auth_latency_min_ms(),
            latency_max_ms: default_auth_latency_max_ms(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl EscalationConfig {
    /// Build the escalation policy. An empty interval table falls back to the
    /// default one; the table is ordered longest first.
    pub fn policy(&self) -> EscalationPolicy {
        let mut intervals: Vec<Duration> = if self.intervals_ms.is_empty() {
            default_intervals_ms()
        } else {
            self.intervals_ms.clone()
        }
        .into_iter()
        .map(Duration::from_millis)
        .collect();
        intervals.sort_by(|a, b| b.cmp(a));

        EscalationPolicy {
            intervals,
            cool_down: Duration::from_secs(self.cool_down_secs),
            countdown_secs: self.countdown_secs,
            notification_delay: Duration::from_millis(self.notification_delay_ms),
            overlay_title: self.overlay_title.clone(),
            overlay_message: self.overlay_message.clone(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the field.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Every leaf value as `(dot.path, value)`, sorted by key. With a
    /// `section`, only keys under that table are returned.
    pub fn entries(&self, section: Option<&str>) -> Vec<(String, String)> {
        fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        flatten(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let Ok(json) = serde_json::to_value(self) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        match section {
            Some(name) => {
                if let Some(table) = json.get(name) {
                    flatten(name, table, &mut out);
                }
            }
            None => flatten("", &json, &mut out),
        }
        out.sort();
        out
    }

    /// Restore one top-level table to its defaults, in memory.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKey` if `section` is not a table of the config.
    pub fn reset_section(&mut self, section: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(section.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: section.to_string(),
            message,
        };
        let defaults = serde_json::to_value(Self::default()).map_err(|e| invalid(e.to_string()))?;
        let fresh = defaults
            .get(section)
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(unknown)?;
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let obj = json.as_object_mut().ok_or_else(unknown)?;
        obj.insert(section.to_string(), fresh);
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.escalation.intervals_ms, vec![8000, 4000, 2000, 1000, 500]);
        assert_eq!(parsed.escalation.cool_down_secs, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[escalation]\ncool_down_secs = 600\n").unwrap();
        assert_eq!(parsed.escalation.cool_down_secs, 600);
        assert_eq!(parsed.escalation.countdown_secs, 2);
        assert_eq!(parsed.share_prompt.min_delay_secs, 20);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("escalation.countdown_secs").as_deref(), Some("2"));
        assert_eq!(cfg.get("share_prompt.enabled").as_deref(), Some("true"));
        assert!(cfg.get("escalation.missing").is_none());
    }

    #[test]
    fn set_value_updates_number_bool_and_array() {
        let mut cfg = Config::default();
        cfg.set_value("escalation.cool_down_secs", "600").unwrap();
        cfg.set_value("share_prompt.enabled", "false").unwrap();
        cfg.set_value("escalation.intervals_ms", "[1000, 500]").unwrap();
        cfg.set_value("social.post_success_rate", "0.5").unwrap();
        assert_eq!(cfg.escalation.cool_down_secs, 600);
        assert!(!cfg.share_prompt.enabled);
        assert_eq!(cfg.escalation.intervals_ms, vec![1000, 500]);
        assert!((cfg.social.post_success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set_value("escalation.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.set_value("share_prompt.enabled", "sometimes").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn entries_flatten_to_sorted_dot_paths() {
        let cfg = Config::default();
        let all = cfg.entries(None);
        assert!(all.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(all.contains(&("escalation.cool_down_secs".into(), "10".into())));
        assert!(all.contains(&(
            "escalation.intervals_ms".into(),
            "[8000,4000,2000,1000,500]".into()
        )));

        let prompt = cfg.entries(Some("share_prompt"));
        assert!(!prompt.is_empty());
        assert!(prompt.iter().all(|(k, _)| k.starts_with("share_prompt.")));
        assert!(cfg.entries(Some("nope")).is_empty());
    }

    #[test]
    fn reset_section_leaves_other_tables_alone() {
        let mut cfg = Config::default();
        cfg.set_value("escalation.cool_down_secs", "600").unwrap();
        cfg.set_value("share_prompt.enabled", "false").unwrap();

        cfg.reset_section("escalation").unwrap();

        assert_eq!(cfg.escalation.cool_down_secs, 10);
        assert!(!cfg.share_prompt.enabled);
        assert!(matches!(
            cfg.reset_section("theme"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn empty_interval_table_falls_back_to_defaults() {
        let mut cfg = Config::default();
        cfg.escalation.intervals_ms.clear();
        let policy = cfg.escalation.policy();
        assert_eq!(policy.intervals.len(), 5);
        assert_eq!(policy.intervals[0], Duration::from_secs(8));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.oauth.token_ttl_secs, 3600);
    }
}
