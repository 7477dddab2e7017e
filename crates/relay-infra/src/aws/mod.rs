//! Shared AWS plumbing: credentials, request signing, event-stream framing.

pub mod credentials;
pub mod event_stream;
pub mod sigv4;

pub use credentials::AwsCredentials;
pub use sigv4::SigV4Signer;

use reqwest::Url;

/// `Host` header value for a URL (port included when non-default).
pub fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
