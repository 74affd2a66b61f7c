use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub server_public_url: Option<String>,
    pub session_cookie: String,
    pub max_form_bytes: usize,
    pub pending_state_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/server.db".into(),
            server_public_url: None,
            session_cookie: "app_session".into(),
            max_form_bytes: 64 * 1024,
            pending_state_ttl_secs: 30 * 60,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_settings(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Ok(v) = std::env::var("SERVER_PUBLIC_URL") {
        settings.server_public_url = Some(v);
    }

    if let Ok(v) = std::env::var("APP__SESSION_COOKIE") {
        settings.session_cookie = v;
    }

    if let Ok(v) = std::env::var("APP__MAX_FORM_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_form_bytes = parsed;
        }
    }

    if let Ok(v) = std::env::var("APP__PENDING_STATE_TTL_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.pending_state_ttl_secs = parsed;
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("server_public_url") {
        settings.server_public_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("session_cookie") {
        settings.session_cookie = v.clone();
    }
    if let Some(parsed) = file_cfg
        .get("max_form_bytes")
        .and_then(|v| v.parse::<usize>().ok())
    {
        settings.max_form_bytes = parsed;
    }
    if let Some(parsed) = file_cfg
        .get("pending_state_ttl_secs")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.pending_state_ttl_secs = parsed;
    }
}

/// Accepts a sqlite URL or a bare file path and returns a sqlite URL.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
