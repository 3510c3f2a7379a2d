use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ExtensionError {
    pub fn storage(err: JsValue) -> Self {
        ExtensionError::Storage(format!("{:?}", err))
    }

    pub fn messaging(err: JsValue) -> Self {
        ExtensionError::Messaging(format!("{:?}", err))
    }

    pub fn dom(err: JsValue) -> Self {
        ExtensionError::Dom(format!("{:?}", err))
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
