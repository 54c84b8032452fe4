//! Google Sheets API v4 backend.
//!
//! Authenticates as a service account: a signed RS256 JWT is exchanged for an
//! access token at the OAuth endpoint, and the token is reused until shortly
//! before it expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::{Rows, SheetStore, SheetsError};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Requested token lifetime; Google caps it at one hour.
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Service account credentials.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccount {
    /// Keys pasted into env files often carry literal `\n` sequences; these are
    /// turned back into newlines.
    pub fn new(client_email: impl Into<String>, private_key: &str) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.replace("\\n", "\n"),
        }
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Request and response body of the `values` endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Rows,
}

/// Sheets client bound to one spreadsheet.
pub struct GoogleSheetsClient {
    client: Client,
    spreadsheet_id: String,
    account: ServiceAccount,
    key: EncodingKey,
    api_base: Url,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheetsClient {
    /// Create a client. Fails if the private key is not a valid RSA PEM.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        account: ServiceAccount,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| SheetsError::Auth(format!("invalid private key: {}", e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("janken-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_base = Url::parse(API_BASE).map_err(|e| SheetsError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            account,
            key,
            api_base,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, fetching a new one if needed.
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.account.client_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        debug!("Requesting access token for {}", self.account.client_email);
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let response = check_status(response).await.map_err(|e| match e {
            SheetsError::HttpStatus { status, message } => {
                SheetsError::Auth(format!("token endpoint returned {}: {}", status, message))
            }
            other => other,
        })?;
        let body: TokenResponse = response.json().await?;

        info!("Obtained access token (expires in {}s)", body.expires_in);
        let token = AccessToken {
            value: body.access_token,
            expires_at: now + chrono::Duration::seconds(body.expires_in),
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn url(&self, range: &str, action: Option<&str>) -> Result<Url, SheetsError> {
        values_url(&self.api_base, &self.spreadsheet_id, range, action)
    }
}

/// `{base}{spreadsheet_id}/values/{range}[:{action}]` with the range encoded
/// as a single path segment.
fn values_url(
    base: &Url,
    spreadsheet_id: &str,
    range: &str,
    action: Option<&str>,
) -> Result<Url, SheetsError> {
    let segment = match action {
        Some(action) => format!("{}:{}", range, action),
        None => range.to_string(),
    };

    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| SheetsError::Unavailable(format!("{} cannot be a base URL", base)))?;
        segments
            .pop_if_empty()
            .push(spreadsheet_id)
            .push("values")
            .push(&segment);
    }
    Ok(url)
}

/// Turn non-2xx responses into `HttpStatus` errors carrying the body.
async fn check_status(response: Response) -> Result<Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        body
    };

    Err(SheetsError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn get(&self, range: &str) -> Result<Rows, SheetsError> {
        let token = self.access_token().await?;
        let url = self.url(range, None)?;

        debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let response = check_status(response).await.inspect_err(|e| {
            warn!("Error fetching sheet data for {}: {}", range, e);
        })?;

        let body: ValueRange = response.json().await?;
        Ok(body.values)
    }

    async fn append(&self, range: &str, rows: Rows) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = self.url(range, Some("append"))?;

        debug!("POST {} ({} rows)", url, rows.len());
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&ValueRange { values: rows })
            .send()
            .await?;
        check_status(response).await.inspect_err(|e| {
            warn!("Error appending sheet data to {}: {}", range, e);
        })?;

        Ok(())
    }

    async fn update(&self, range: &str, rows: Rows) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = self.url(range, None)?;

        debug!("PUT {} ({} rows)", url, rows.len());
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&ValueRange { values: rows })
            .send()
            .await?;
        check_status(response).await.inspect_err(|e| {
            warn!("Error updating sheet data in {}: {}", range, e);
        })?;

        Ok(())
    }
}
