use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
