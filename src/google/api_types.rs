//! Serde-deserializable types matching Google API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Serialize};

// ============================================================================
// Sheets: spreadsheets.values.batchGet
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBatchGetResponse {
  #[serde(default)]
  pub value_ranges: Vec<ApiValueRange>,
}

#[derive(Debug, Deserialize)]
pub struct ApiValueRange {
  /// Absent entirely when the range is empty
  #[serde(default)]
  pub values: Vec<Vec<String>>,
}

// ============================================================================
// OAuth2 token endpoint
// ============================================================================

/// Claims of the service-account JWT bearer assertion.
#[derive(Debug, Serialize)]
pub struct ApiJwtClaims<'a> {
  pub iss: &'a str,
  pub scope: &'a str,
  pub aud: &'a str,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiTokenResponse {
  pub access_token: String,
  #[serde(default = "default_expires_in")]
  pub expires_in: i64,
}

fn default_expires_in() -> i64 {
  3600
}

// ============================================================================
// Error bodies
// ============================================================================

/// `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
  pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub status: Option<String>,
}

/// OAuth endpoints use a flat shape instead.
#[derive(Debug, Deserialize)]
pub struct ApiOAuthError {
  pub error: String,
  #[serde(default)]
  pub error_description: Option<String>,
}

/// Best-effort human message from an error body.
pub fn error_message(body: &str) -> String {
  if let Ok(api) = serde_json::from_str::<ApiErrorResponse>(body) {
    return match api.error.status {
      Some(status) => format!("{} ({})", api.error.message, status),
      None => api.error.message,
    };
  }
  if let Ok(oauth) = serde_json::from_str::<ApiOAuthError>(body) {
    return match oauth.error_description {
      Some(desc) => format!("{}: {}", oauth.error, desc),
      None => oauth.error,
    };
  }
  body.trim().chars().take(200).collect()
}
