//! Wire types shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Error object the API returns in the body of a non-2xx response.
///
/// Every field is optional on the wire; a body that is valid JSON but not an
/// object (or has a field of the wrong type) does not decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
}
