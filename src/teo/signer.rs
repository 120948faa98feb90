//! TC3-HMAC-SHA256 Request Signing
//!
//! Every call is a `POST /` with an empty query string, so the canonical
//! request only varies by host, action and payload.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credential;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Signs EdgeOne requests for one credential and service
pub struct Tc3Signer<'a> {
    credential: &'a Credential,
    service: &'a str,
}

impl<'a> Tc3Signer<'a> {
    pub fn new(credential: &'a Credential, service: &'a str) -> Self {
        Self {
            credential,
            service,
        }
    }

    /// Build the `Authorization` header value.
    ///
    /// `timestamp` is unix seconds and must be the same value sent as
    /// `X-TC-Timestamp`; the credential scope date is its UTC day.
    pub fn authorization(&self, host: &str, action: &str, payload: &[u8], timestamp: i64) -> String {
        let date = utc_date(timestamp);
        let scope = format!("{}/{}/tc3_request", date, self.service);

        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{}\nhost:{}\nx-tc-action:{}\n\n{}\n{}",
            CONTENT_TYPE,
            host,
            action.to_lowercase(),
            SIGNED_HEADERS,
            sha256_hex(payload)
        );

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(
            format!("TC3{}", self.credential.secret_key).as_bytes(),
            date.as_bytes(),
        );
        let secret_service = hmac_sha256(&secret_date, self.service.as_bytes());
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
        let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.credential.secret_id, scope, SIGNED_HEADERS, signature
        )
    }
}

fn utc_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
