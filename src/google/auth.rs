//! OAuth2 bearer tokens for the Sheets and Drive APIs.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::api_types::{error_message, ApiJwtClaims, ApiTokenResponse};
use crate::config::Config;
use crate::error::{DashError, DashResult};

/// Read-only access is all the dashboard needs.
pub const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets.readonly \
                          https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are renewed this long before Google would reject them.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account JSON key that the token exchange uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
  pub client_email: String,
  pub private_key: String,
  #[serde(default)]
  pub private_key_id: Option<String>,
  #[serde(default = "default_token_uri")]
  pub token_uri: String,
}

fn default_token_uri() -> String {
  DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServiceAccountKey")
      .field("client_email", &self.client_email)
      .field("private_key_id", &self.private_key_id)
      .field("token_uri", &self.token_uri)
      .finish_non_exhaustive()
  }
}

impl ServiceAccountKey {
  pub fn from_json(json: &str) -> DashResult<Self> {
    serde_json::from_str(json)
      .map_err(|e| DashError::Auth(format!("malformed service account key: {}", e)))
  }
}

#[derive(Debug)]
enum Credentials {
  ServiceAccount(ServiceAccountKey),
  /// Pre-issued token, e.g. from `gcloud auth print-access-token`
  Token(String),
}

#[derive(Debug, Clone)]
struct AccessToken {
  value: String,
  expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens, exchanging the service-account key when needed.
#[derive(Debug)]
pub struct Authenticator {
  http: reqwest::Client,
  credentials: Credentials,
  cached: Mutex<Option<AccessToken>>,
}

impl Authenticator {
  /// Build from the configured credentials.
  ///
  /// An explicit access token wins over a service-account key.
  pub fn new(config: &Config, http: reqwest::Client) -> Result<Self> {
    if let Some(token) = Config::get_access_token() {
      info!("using access token from environment");
      return Ok(Self::with_token(http, token));
    }

    let json = config.get_service_account_json()?;
    let key = ServiceAccountKey::from_json(&json).map_err(|e| eyre!("{}", e))?;
    info!(client = %key.client_email, "using service account");
    Ok(Self::with_service_account(http, key))
  }

  pub fn with_service_account(http: reqwest::Client, key: ServiceAccountKey) -> Self {
    Self {
      http,
      credentials: Credentials::ServiceAccount(key),
      cached: Mutex::new(None),
    }
  }

  pub fn with_token(http: reqwest::Client, token: impl Into<String>) -> Self {
    Self {
      http,
      credentials: Credentials::Token(token.into()),
      cached: Mutex::new(None),
    }
  }

  /// Current bearer token, exchanging a new one if the cached token is
  /// missing or about to expire.
  pub async fn bearer(&self) -> DashResult<String> {
    let key = match &self.credentials {
      Credentials::Token(token) => return Ok(token.clone()),
      Credentials::ServiceAccount(key) => key,
    };

    let mut cached = self.cached.lock().await;
    if let Some(token) = cached.as_ref() {
      if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
        return Ok(token.value.clone());
      }
    }

    let token = self.exchange(key).await?;
    let value = token.value.clone();
    *cached = Some(token);
    Ok(value)
  }

  async fn exchange(&self, key: &ServiceAccountKey) -> DashResult<AccessToken> {
    let now = Utc::now();
    let assertion = sign_assertion(key, now)?;

    debug!(token_uri = %key.token_uri, "exchanging service account assertion");
    let response = self
      .http
      .post(&key.token_uri)
      .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
      .send()
      .await
      .map_err(|e| DashError::Auth(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(DashError::Auth(format!(
        "token endpoint returned {}: {}",
        status,
        error_message(&body)
      )));
    }

    let token: ApiTokenResponse = response
      .json()
      .await
      .map_err(|e| DashError::Auth(format!("unreadable token response: {}", e)))?;

    Ok(AccessToken {
      value: token.access_token,
      expires_at: now + Duration::seconds(token.expires_in),
    })
  }
}

/// RS256-signed JWT bearer assertion for the token endpoint.
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> DashResult<String> {
  let claims = ApiJwtClaims {
    iss: &key.client_email,
    scope: SCOPES,
    aud: &key.token_uri,
    iat: now.timestamp(),
    exp: (now + Duration::hours(1)).timestamp(),
  };

  let mut header = Header::new(Algorithm::RS256);
  header.kid = key.private_key_id.clone();

  let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
    .map_err(|e| DashError::Auth(format!("invalid service account private key: {}", e)))?;

  encode(&header, &claims, &encoding_key)
    .map_err(|e| DashError::Auth(format!("failed to sign assertion: {}", e)))
}
