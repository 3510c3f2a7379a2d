/// Background service worker: tells content scripts about finished navigations
/// and greets new installs
use crate::bridge;
use crate::config::{
    CHANGELOG_URL, INSTALL_NOTIFICATION_MESSAGE, INSTALL_NOTIFICATION_TITLE,
    MESSAGE_RETRY_DELAY_MS, WELCOME_URL,
};
use crate::messages::ExtMessage;
use crate::site::resolve_url;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    Other,
}

impl InstallReason {
    pub fn parse(reason: &str) -> InstallReason {
        match reason {
            "install" => InstallReason::Install,
            "update" => InstallReason::Update,
            _ => InstallReason::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    OpenTab(&'static str),
    Notify {
        title: &'static str,
        message: &'static str,
    },
}

pub fn install_actions(reason: InstallReason) -> Vec<InstallAction> {
    match reason {
        InstallReason::Install => vec![
            InstallAction::OpenTab(WELCOME_URL),
            InstallAction::Notify {
                title: INSTALL_NOTIFICATION_TITLE,
                message: INSTALL_NOTIFICATION_MESSAGE,
            },
        ],
        InstallReason::Update => vec![InstallAction::OpenTab(CHANGELOG_URL)],
        InstallReason::Other => Vec::new(),
    }
}

async fn run_install_actions(reason: InstallReason) {
    for action in install_actions(reason) {
        let result = match action {
            InstallAction::OpenTab(url) => bridge::open_tab(url).await,
            InstallAction::Notify { title, message } => {
                bridge::create_notification(title, message).await
            }
        };
        if let Err(e) = result {
            log::warn!("Install action {:?} failed: {}", action, e);
        }
    }
}

/// Send `pageChanged`, retrying once when the content script wasn't listening yet
async fn notify_tab(tab_id: i32) {
    let message = ExtMessage::PageChanged;
    if bridge::send_tab_message(tab_id, &message).await.is_ok() {
        return;
    }

    bridge::delay(MESSAGE_RETRY_DELAY_MS).await;
    if let Err(e) = bridge::send_tab_message(tab_id, &message).await {
        log::debug!("Tab {} did not take pageChanged: {}", tab_id, e);
    }
}

pub fn start() {
    bridge::on_tab_updated(|tab_id, url| {
        if let Some(site) = resolve_url(&url) {
            log::debug!("Tab {} finished loading {}", tab_id, site.key());
            spawn_local(notify_tab(tab_id));
        }
    });

    bridge::on_installed(|reason| {
        let reason = InstallReason::parse(&reason);
        log::info!("Extension lifecycle event: {:?}", reason);
        spawn_local(run_install_actions(reason));
    });
}
