/// Escape the Algorithm - browser extension that hides algorithmic feeds
/// Built with Rust + WASM + Yew

mod background;
mod bridge;
pub mod config;
mod content;
pub mod controller;
pub mod countdown;
pub mod dom;
pub mod error;
pub mod messages;
pub mod page;
pub mod prefs;
pub mod registry;
pub mod site;
pub mod toggle;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Site identifier for a hostname, "none" when unsupported
#[wasm_bindgen]
pub fn site_for_host(hostname: &str) -> String {
    site::resolve_site(hostname)
        .map(|site| site.key().to_string())
        .unwrap_or_else(|| "none".to_string())
}

// Entry point for the content script
#[wasm_bindgen]
pub fn start_content() {
    content::start();
}

// Entry point for the background service worker
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
