use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pricetalk::{Forum, Identity, RedisStore, Settings};

use crate::output::OutputManager;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pricetalk.toml";

/// Everything a command needs: the forum over Redis and the caller, if any.
pub struct AppContext {
    pub forum: Forum<RedisStore>,
    pub identity: Option<Identity>,
}

impl AppContext {
    pub async fn connect(config: Option<&Path>, identity: Option<Identity>, output: &OutputManager) -> Result<Self> {
        let settings = load_settings(config)?;
        output.verbose(&format!(
            "using redis at {} (prefix '{}')",
            settings.redis.url, settings.redis.key_prefix
        ));

        let store = RedisStore::connect(&settings.redis)
            .await
            .with_context(|| format!("Failed to connect to Redis at {}", settings.redis.url))?;

        Ok(Self {
            forum: Forum::with_settings(store, &settings),
            identity,
        })
    }

    pub fn caller(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Explicit path, else `pricetalk.toml` when present, else defaults. Environment overrides apply in every case.
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let path = match config {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.is_file()),
    };

    match path {
        Some(path) => Settings::load(&path).with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let mut settings = Settings::default();
            settings.apply_env();
            Ok(settings)
        }
    }
}

/// `--user` resolves the caller; without it every command runs unauthenticated.
pub fn resolve_identity(user: Option<String>, email: Option<String>, admin: bool) -> Option<Identity> {
    user.map(|user_id| {
        let identity = if admin { Identity::admin(user_id) } else { Identity::user(user_id) };
        match email {
            Some(email) => identity.with_email(email),
            None => identity,
        }
    })
}
