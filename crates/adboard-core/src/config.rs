use std::{env, fs, path::Path, time::Duration};

use crate::{domain::UserId, errors::Error, Result};

/// Typed configuration loaded from environment (with `.env` support).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// The single administrator identity for complaint actions.
    pub admin: UserId,

    // Moderation provider
    pub moderation_api_key: String,
    pub moderation_model: String,
    pub moderation_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin = env_i64("ADMIN_ID")
            .map(UserId)
            .ok_or_else(|| Error::Config("ADMIN_ID environment variable is required".to_string()))?;

        let moderation_api_key = env_str("OPENAI_API_KEY").and_then(non_empty).ok_or_else(|| {
            Error::Config("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        let moderation_model =
            env_str("MODERATION_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let moderation_timeout =
            Duration::from_millis(env_u64("MODERATION_TIMEOUT_MS").unwrap_or(10_000));

        Ok(Self {
            bot_token,
            admin,
            moderation_api_key,
            moderation_model,
            moderation_timeout,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
