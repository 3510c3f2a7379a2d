/// Runtime messages exchanged between the background and content scripts
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtMessage {
    /// A tab finished loading a URL on a supported site
    PageChanged,
}

/// Reply sent for every message the content script understood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub received: bool,
}

impl Ack {
    pub fn received() -> Ack {
        Ack { received: true }
    }
}
