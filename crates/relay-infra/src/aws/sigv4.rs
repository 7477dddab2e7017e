//! AWS Signature Version 4 request signing.
//!
//! A minimal signer covering what the relay sends: header-signed requests
//! with a fully buffered payload. No presigning, no chunked uploads.
//!
//! ```text
//! canonical request -> string to sign -> HMAC chain signing key -> signature
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::credentials::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),
}

/// The parts of an outgoing request that take part in the signature.
///
/// `path` is the path exactly as sent on the wire (already percent-encoded
/// once); `query` is already in canonical form (sorted, encoded) or empty.
/// `headers` are the extra headers that will be sent, with lowercase names.
#[derive(Debug, Clone, Copy)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

/// Signs requests for one service in one region.
pub struct SigV4Signer {
    credentials: Arc<AwsCredentials>,
    region: String,
    service: String,
    /// Every service except S3 expects the path to be encoded a second time.
    double_encode_path: bool,
    /// S3 requires `x-amz-content-sha256` on every request.
    sign_payload_header: bool,
}

impl SigV4Signer {
    pub fn new(credentials: Arc<AwsCredentials>, region: impl Into<String>, service: impl Into<String>) -> Self {
        let service = service.into();
        let is_s3 = service == "s3";
        Self {
            credentials,
            region: region.into(),
            service,
            double_encode_path: !is_s3,
            sign_payload_header: is_s3,
        }
    }

    /// Sign `request` as of `now`.
    ///
    /// Returns the headers to add to the outgoing request: `x-amz-date`,
    /// optionally `x-amz-content-sha256` and `x-amz-security-token`, and
    /// `authorization`. `host` is signed but left to the HTTP client.
    pub fn sign(
        &self,
        request: &SignableRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, SigningError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = sha256_hex(request.payload);

        let mut added: Vec<(String, String)> = vec![("x-amz-date".to_string(), amz_date.clone())];
        if self.sign_payload_header {
            added.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
        }
        if let Some(token) = self.credentials.session_token() {
            added.push((
                "x-amz-security-token".to_string(),
                token.expose_secret().to_string(),
            ));
        }

        let mut signed: Vec<(String, String)> = Vec::with_capacity(request.headers.len() + added.len() + 1);
        signed.push(("host".to_string(), request.host.to_string()));
        signed.extend(
            request
                .headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string())),
        );
        signed.extend(added.iter().cloned());

        let canonical_path = if self.double_encode_path {
            uri_encode(request.path, false)
        } else {
            request.path.to_string()
        };
        let (canonical_headers, signed_headers) = canonical_headers(&signed);

        let canonical = canonical_request(
            request.method,
            &canonical_path,
            request.query,
            &canonical_headers,
            &signed_headers,
            &payload_hash,
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical.as_bytes())
        );

        let key = signing_key(
            self.credentials.secret_access_key().expose_secret(),
            &date,
            &self.region,
            &self.service,
        )?;
        let signature = to_hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

        added.push((
            "authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id()
            ),
        ));

        Ok(added)
    }
}

/// Percent-encode per the SigV4 rules: unreserved characters pass through,
/// everything else becomes `%XX` (uppercase). `/` is kept unless
/// `encode_slash` is set.
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Derive the per-day, per-region, per-service signing key.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Sorted `name:value\n` block plus the `;`-joined name list.
fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut sorted: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.to_ascii_lowercase(),
                v.split_whitespace().collect::<Vec<_>>().join(" "),
            )
        })
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let block = sorted
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect::<String>();
    let names = sorted
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (block, names)
}

fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!("{method}\n{path}\n{query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}")
}
