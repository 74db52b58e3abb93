use cma_api::TransportError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failure of an entry service operation.
///
/// Transport failures are passed through untouched. Schema lookups that find
/// nothing are not errors; see [`SchemaResolver`](crate::SchemaResolver).
#[derive(Debug, Error)]
pub enum ContentError {
    /// The entry could not be encoded. Nothing was sent.
    #[error("failed to serialize entry: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The inputs cannot form a valid request. Nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The service answered, but not with the expected shape.
    #[error("failed to decode {target} from response: {source}")]
    Decode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(target: &'static str, payload: Value) -> Result<T, ContentError> {
    serde_json::from_value(payload).map_err(|source| ContentError::Decode { target, source })
}
