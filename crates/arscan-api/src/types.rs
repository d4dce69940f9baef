// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the REST backend and the Firestore REST API.

use arscan_core::{MarkerRecord, User};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadMarkerRequest<'a> {
    pub marker_id: &'a str,
    #[serde(flatten)]
    pub record: &'a MarkerRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentUserResponse {
    pub user: User,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A Firestore document as returned by `documents.get`.
#[derive(Debug, Deserialize)]
pub(crate) struct FirestoreDocument {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl FirestoreDocument {
    /// Flatten typed Firestore fields into plain JSON.
    pub fn into_plain_json(self) -> Value {
        fields_to_json(&self.fields)
    }
}

fn fields_to_json(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), typed_value_to_json(v)))
            .collect(),
    )
}

/// Convert one Firestore `Value` (`{"stringValue": "..."}` etc.) to JSON.
pub(crate) fn typed_value_to_json(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "booleanValue" | "doubleValue" => inner.clone(),
        // int64 values travel as decimal strings
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "mapValue" => inner
            .get("fields")
            .and_then(Value::as_object)
            .map(fields_to_json)
            .unwrap_or_else(|| Value::Object(Map::new())),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(typed_value_to_json).collect())
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}
