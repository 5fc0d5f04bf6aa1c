//! Per-path body encoding
//!
//! Record CRUD endpoints always speak MessagePack, everything else always
//! speaks JSON. The decision depends only on the request path, so a request
//! and its response are always encoded the same way.

use crate::error::{ClientError, Result};
use ekodb_core::SerializationFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Paths encoded with MessagePack, matched by prefix
pub const BINARY_PATH_PREFIXES: &[&str] = &[
    "/api/insert/",
    "/api/find/",
    "/api/update/",
    "/api/delete/",
    "/api/batch/insert/",
    "/api/batch/update/",
    "/api/batch/delete/",
];

pub fn format_for_path(path: &str) -> SerializationFormat {
    if BINARY_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        SerializationFormat::MessagePack
    } else {
        SerializationFormat::Json
    }
}

pub fn serialize<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<Vec<u8>> {
    let format = format_for_path(path);
    let encoded = match format {
        SerializationFormat::MessagePack => {
            rmp_serde::to_vec_named(value).map_err(|e| e.to_string())
        }
        SerializationFormat::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
    };
    encoded.map_err(|message| ClientError::Encode { format, message })
}

pub fn deserialize<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T> {
    let format = format_for_path(path);
    let decoded = match format {
        SerializationFormat::MessagePack => {
            rmp_serde::from_slice(bytes).map_err(|e| e.to_string())
        }
        SerializationFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
    };
    decoded.map_err(|message| ClientError::Decode { format, message })
}
