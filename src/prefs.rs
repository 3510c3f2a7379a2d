/// User preferences kept in chrome.storage.sync
///
/// Storage holds one boolean per site (missing means enabled), a strict-mode
/// flag (missing means off) and a theme. Values are decoded leniently: a key
/// with an unexpected type is treated as missing rather than failing the load.
use crate::config::{LEGACY_STRICT_KEY, STRICT_KEY, THEME_KEY};
use crate::site::SiteId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn key(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_key(key: &str) -> Option<Theme> {
        match key {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    /// Stored theme, or the browser's colour scheme when none was chosen
    pub fn resolve(stored: Option<Theme>, prefers_dark: bool) -> Theme {
        stored.unwrap_or(if prefers_dark { Theme::Dark } else { Theme::Light })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPreferences {
    sites: HashMap<SiteId, bool>,
    strict: Option<bool>,
    legacy_strict: Option<bool>,
    theme: Option<Theme>,
}

impl StoredPreferences {
    /// Every key read in the bulk get
    pub fn storage_keys() -> Vec<&'static str> {
        SiteId::ALL
            .iter()
            .map(|site| site.key())
            .chain([STRICT_KEY, LEGACY_STRICT_KEY, THEME_KEY])
            .collect()
    }

    /// Decode the object returned by `storage.sync.get`
    pub fn from_value(value: &Value) -> StoredPreferences {
        let mut prefs = StoredPreferences::default();
        let Some(object) = value.as_object() else {
            return prefs;
        };

        for site in SiteId::ALL {
            if let Some(enabled) = object.get(site.key()).and_then(Value::as_bool) {
                prefs.sites.insert(site, enabled);
            }
        }
        prefs.strict = object.get(STRICT_KEY).and_then(Value::as_bool);
        prefs.legacy_strict = object.get(LEGACY_STRICT_KEY).and_then(Value::as_bool);
        prefs.theme = object
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .and_then(Theme::from_key);
        prefs
    }

    pub fn site_enabled(&self, site: SiteId) -> bool {
        self.sites.get(&site).copied().unwrap_or(true)
    }

    pub fn strict(&self) -> bool {
        self.strict.or(self.legacy_strict).unwrap_or(false)
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn set_site(&mut self, site: SiteId, enabled: bool) {
        self.sites.insert(site, enabled);
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = Some(strict);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }
}

/// One live change reported by `storage.onChanged`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceChange {
    Site(SiteId, bool),
    Strict(bool),
    Theme(Option<Theme>),
}

/// Decode a `{ key: { oldValue, newValue } }` change set, ignoring unknown keys
pub fn parse_changes(changes: &Value) -> Vec<PreferenceChange> {
    let Some(object) = changes.as_object() else {
        return Vec::new();
    };

    object
        .iter()
        .filter_map(|(key, change)| {
            let new_value = change.get("newValue");
            if let Some(site) = SiteId::from_key(key) {
                // A removed key falls back to the default, which is enabled
                let enabled = new_value.and_then(Value::as_bool).unwrap_or(true);
                return Some(PreferenceChange::Site(site, enabled));
            }
            match key.as_str() {
                STRICT_KEY | LEGACY_STRICT_KEY => Some(PreferenceChange::Strict(
                    new_value.and_then(Value::as_bool).unwrap_or(false),
                )),
                THEME_KEY => Some(PreferenceChange::Theme(
                    new_value.and_then(Value::as_str).and_then(Theme::from_key),
                )),
                _ => None,
            }
        })
        .collect()
}
