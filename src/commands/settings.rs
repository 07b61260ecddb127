//! Settings commands
//!
//! This module handles:
//! - get_setting / set_setting: Key-value access to the session settings
//! - get_settings: The whole settings object

use super::state::Session;
use crate::config::Settings;

pub fn get_setting(session: &Session, key: &str) -> Result<Option<String>, String> {
    session.settings.get(key)
}

pub fn set_setting(session: &mut Session, key: &str, value: &str) -> Result<(), String> {
    log::info!("Setting {} = {}", key, value);
    session.settings.set(key, value)
}

pub fn get_settings(session: &Session) -> Result<Settings, String> {
    Ok(session.settings.clone())
}
