use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, SdkError};

/// One error of a [`Response`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    pub kind: ErrorKind,
}

impl From<&SdkError> for ResponseError {
    fn from(err: &SdkError) -> Self {
        Self {
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Result of executing a document: `data` on success, `errors` otherwise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn error(err: &SdkError) -> Self {
        Self {
            data: None,
            errors: vec![err.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
