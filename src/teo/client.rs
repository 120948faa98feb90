//! EdgeOne API Client
//!
//! Signed JSON-over-HTTPS client for the `teo` service, version 2022-09-01.
//! One client is built per inbound request from the current environment.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::models::{
    DescribeL7AccRulesRequest, DescribeL7AccRulesResponse, ModifyL7AccRuleRequest,
    ModifyL7AccRuleResponse,
};
use super::signer::{Tc3Signer, CONTENT_TYPE};
use crate::config::{Credential, TeoConfig};
use crate::error::TeoError;

pub const SERVICE: &str = "teo";
pub const API_VERSION: &str = "2022-09-01";

const ACTION_DESCRIBE_RULES: &str = "DescribeL7AccRules";
const ACTION_MODIFY_RULE: &str = "ModifyL7AccRule";

// ============================================================
// Response Envelope
// ============================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Unwrap `{"Response": {...}}`, surfacing `Response.Error` as `TeoError::Api`
fn parse_envelope<T: DeserializeOwned>(action: &'static str, body: &[u8]) -> Result<T, TeoError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|source| TeoError::Decode { action, source })?;

    if let Some(error) = envelope.response.get("Error") {
        let error: ApiErrorBody = serde_json::from_value(error.clone())
            .map_err(|source| TeoError::Decode { action, source })?;
        let request_id = envelope
            .response
            .get("RequestId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        return Err(TeoError::Api {
            code: error.code,
            message: error.message,
            request_id,
        });
    }

    serde_json::from_value(envelope.response).map_err(|source| TeoError::Decode { action, source })
}

// ============================================================
// Client Implementation
// ============================================================

/// EdgeOne API client
pub struct TeoClient {
    http_client: Client,
    credential: Credential,
    region: String,
    language: Option<String>,
    url: Url,
    host: String,
}

impl TeoClient {
    /// Create a client from a loaded configuration
    pub fn new(config: &TeoConfig) -> Result<Self, TeoError> {
        let (url, host) = resolve_endpoint(&config.endpoint)?;

        let http_client = Client::builder()
            .user_agent(concat!("teo-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(TeoError::ClientBuild)?;

        Ok(Self {
            http_client,
            credential: config.credential.clone(),
            region: config.region.clone(),
            language: config.language.clone(),
            url,
            host,
        })
    }

    /// List the L7 access rules of a zone
    pub async fn describe_l7_acc_rules(
        &self,
        request: &DescribeL7AccRulesRequest,
    ) -> Result<DescribeL7AccRulesResponse, TeoError> {
        self.call(ACTION_DESCRIBE_RULES, request).await
    }

    /// Modify one L7 access rule
    pub async fn modify_l7_acc_rule(
        &self,
        request: &ModifyL7AccRuleRequest,
    ) -> Result<ModifyL7AccRuleResponse, TeoError> {
        self.call(ACTION_MODIFY_RULE, request).await
    }

    /// Sign and send one action, returning the decoded inner `Response`
    async fn call<B, T>(&self, action: &'static str, request: &B) -> Result<T, TeoError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(request).map_err(|source| TeoError::Encode { action, source })?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let authorization = Tc3Signer::new(&self.credential, SERVICE).authorization(
            &self.host,
            action,
            &payload,
            timestamp,
        );

        debug!(
            "Calling {} on {} (region: {}, {} bytes)",
            action,
            self.host,
            self.region,
            payload.len()
        );

        let mut builder = self
            .http_client
            .post(self.url.clone())
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.region);

        if let Some(language) = &self.language {
            builder = builder.header("X-TC-Language", language);
        }

        let response = builder
            .body(payload)
            .send()
            .await
            .map_err(|source| TeoError::Transport { action, source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| TeoError::Transport { action, source })?;

        debug!("{} answered HTTP {} ({} bytes)", action, status, body.len());

        if !status.is_success() {
            // Prefer the remote error envelope when the gateway in front of the API sent one
            return match parse_envelope::<Value>(action, &body) {
                Err(err @ TeoError::Api { .. }) => Err(err),
                _ => Err(TeoError::HttpStatus {
                    action,
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                }),
            };
        }

        parse_envelope(action, &body)
    }
}

/// Turn `TEO_ENDPOINT` into a request URL and the signing host.
///
/// A bare host gets `https://`; a full URL keeps its scheme and port.
fn resolve_endpoint(endpoint: &str) -> Result<(Url, String), TeoError> {
    let invalid = |reason: String| TeoError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let raw = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?
        .to_string();
    url.set_path("/");
    url.set_query(None);

    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };

    Ok((url, host))
}
