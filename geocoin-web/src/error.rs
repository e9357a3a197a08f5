use geocoin_game::{ActionError, CellKeyError, ConfigError, TokenIdError};
use wasm_bindgen::JsValue;

/// Failures surfaced to the page as thrown strings.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("game is busy handling another event")]
    Busy,
    #[error(transparent)]
    CacheKey(#[from] CellKeyError),
    #[error(transparent)]
    TokenId(#[from] TokenIdError),
    #[error("unknown direction `{0}`")]
    Direction(String),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("config is not valid JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),
    #[error("encoding result failed: {0}")]
    Encode(#[from] serde_wasm_bindgen::Error),
    #[error("browser call failed: {0}")]
    Browser(String),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        Self::from_str(&err.to_string())
    }
}
