use serde_derive::{Deserialize, Serialize};

/// Body of any response with a status above 299.
///
/// ```json
/// {"message": "Not Found", "request_id": "3f2a"}
/// ```
#[derive(PartialEq, Eq, Debug, Deserialize, Serialize, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
