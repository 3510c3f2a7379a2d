/// Typed wrappers around the extension APIs exposed by js/extension.js
use crate::error::{self, ExtensionError};
use crate::messages::{Ack, ExtMessage};
use crate::prefs::{PreferenceChange, StoredPreferences, parse_changes};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncSettings(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncSetting(key: &str, value: JsValue) -> Result<(), JsValue>;

    fn onSyncSettingsChanged(callback: &js_sys::Function);

    fn onRuntimeMessage(callback: &js_sys::Function);

    fn onTabUpdated(callback: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    fn onInstalled(callback: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createNotification(title: &str, message: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sleep(ms: i32) -> Result<(), JsValue>;
}

fn to_js<T: Serialize>(value: &T) -> error::Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Read every preference key in one bulk get
pub async fn load_preferences() -> error::Result<StoredPreferences> {
    let keys = to_js(&StoredPreferences::storage_keys())?;
    let raw = getSyncSettings(keys).await.map_err(ExtensionError::storage)?;
    let value: serde_json::Value = serde_wasm_bindgen::from_value(raw)?;
    Ok(StoredPreferences::from_value(&value))
}

pub async fn save_setting<T: Serialize>(key: &str, value: &T) -> error::Result<()> {
    setSyncSetting(key, to_js(value)?)
        .await
        .map_err(ExtensionError::storage)
}

/// Subscribe to sync-area changes for the lifetime of the page
pub fn on_settings_changed(handler: impl Fn(Vec<PreferenceChange>) + 'static) {
    let callback = Closure::wrap(Box::new(move |changes: JsValue| {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(changes) {
            Ok(changes) => handler(parse_changes(&changes)),
            Err(e) => log::warn!("Unreadable storage change: {:?}", e),
        }
    }) as Box<dyn Fn(JsValue)>);
    onSyncSettingsChanged(callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Answer runtime messages; `None` leaves the message unanswered
pub fn on_runtime_message(handler: impl Fn(ExtMessage) -> Option<Ack> + 'static) {
    let callback = Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
        let message = match serde_wasm_bindgen::from_value::<ExtMessage>(message) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("Ignoring unknown message: {:?}", e);
                return JsValue::UNDEFINED;
            }
        };
        match handler(message).map(|ack| to_js(&ack)) {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => {
                log::warn!("Failed to encode reply: {}", e);
                JsValue::UNDEFINED
            }
            None => JsValue::UNDEFINED,
        }
    }) as Box<dyn Fn(JsValue) -> JsValue>);
    onRuntimeMessage(callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Called with `(tab_id, url)` whenever a tab finishes loading
pub fn on_tab_updated(handler: impl Fn(i32, String) + 'static) {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn Fn(i32, String)>);
    onTabUpdated(callback.as_ref().unchecked_ref());
    callback.forget();
}

pub async fn send_tab_message(tab_id: i32, message: &ExtMessage) -> error::Result<JsValue> {
    sendTabMessage(tab_id, to_js(message)?)
        .await
        .map_err(ExtensionError::messaging)
}

/// Called with the install reason (`install`, `update`, ...)
pub fn on_installed(handler: impl Fn(String) + 'static) {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn Fn(String)>);
    onInstalled(callback.as_ref().unchecked_ref());
    callback.forget();
}

pub async fn open_tab(url: &str) -> error::Result<()> {
    openTab(url).await.map_err(ExtensionError::messaging)
}

pub async fn create_notification(title: &str, message: &str) -> error::Result<()> {
    createNotification(title, message)
        .await
        .map_err(ExtensionError::messaging)
}

/// Timer that also works in the service worker, where there is no window
pub async fn delay(ms: i32) {
    if let Err(e) = sleep(ms).await {
        log::debug!("Timer failed: {:?}", e);
    }
}
