//! S3ObjectStore -- concrete [`ObjectStore`] backed by Amazon S3.
//!
//! Issues a single SigV4-signed `PutObject` per write. Uses the
//! virtual-hosted endpoint `https://{bucket}.s3.{region}.amazonaws.com` by
//! default, or path-style addressing against an explicit endpoint.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Url;

use relay_core::store::{ObjectStore, PutObject};
use relay_types::error::StoreError;

use crate::aws::credentials::AwsCredentials;
use crate::aws::host_header;
use crate::aws::sigv4::{uri_encode, SignableRequest, SigV4Signer};

const SIGNING_SERVICE: &str = "s3";

/// Amazon S3 (or an S3-compatible store) for one bucket.
pub struct S3ObjectStore {
    client: reqwest::Client,
    signer: SigV4Signer,
    endpoint: Url,
    host: String,
    bucket: String,
    /// Path-style puts go to `/{bucket}/{key}` instead of `/{key}`.
    path_style: bool,
}

impl S3ObjectStore {
    /// Store for `bucket` on the regional virtual-hosted endpoint.
    pub fn new(
        credentials: Arc<AwsCredentials>,
        region: &str,
        bucket: &str,
    ) -> Result<Self, StoreError> {
        let endpoint = format!("https://{bucket}.s3.{region}.amazonaws.com");
        Self::build(credentials, region, bucket, &endpoint, false)
    }

    /// Store for `bucket` behind an explicit endpoint, addressed path-style.
    pub fn with_endpoint(
        credentials: Arc<AwsCredentials>,
        region: &str,
        bucket: &str,
        endpoint: &str,
    ) -> Result<Self, StoreError> {
        Self::build(credentials, region, bucket, endpoint, true)
    }

    fn build(
        credentials: Arc<AwsCredentials>,
        region: &str,
        bucket: &str,
        endpoint: &str,
        path_style: bool,
    ) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Http(format!("invalid store endpoint '{endpoint}': {e}")))?;
        let host = host_header(&endpoint)
            .ok_or_else(|| StoreError::Http(format!("store endpoint '{endpoint}' has no host")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StoreError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            signer: SigV4Signer::new(credentials, region, SIGNING_SERVICE),
            endpoint,
            host,
            bucket: bucket.to_string(),
            path_style,
        })
    }

    /// Wire path for `key`. Each segment is encoded; `/` separators are kept.
    fn object_path(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| uri_encode(segment, true))
            .collect::<Vec<_>>()
            .join("/");
        if self.path_style {
            format!("/{}/{encoded}", uri_encode(&self.bucket, true))
        } else {
            format!("/{encoded}")
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        let path = self.object_path(&object.key);

        let mut headers: Vec<(&str, &str)> = vec![("content-type", object.content_type.as_str())];
        if let Some(sse) = object.server_side_encryption {
            headers.push(("x-amz-server-side-encryption", sse.as_str()));
        }

        let signable = SignableRequest {
            method: "PUT",
            host: &self.host,
            path: &path,
            query: "",
            headers: &headers,
            payload: &object.body,
        };
        let signed = self
            .signer
            .sign(&signable, Utc::now())
            .map_err(|e| StoreError::Http(format!("failed to sign request: {e}")))?;

        let mut url = self.endpoint.clone();
        url.set_path(&path);

        let mut request = self.client.put(url);
        for (name, value) in &headers {
            request = request.header(*name, *value);
        }
        for (name, value) in signed {
            request = request.header(name, value);
        }

        tracing::debug!(bucket = %self.bucket, key = %object.key, bytes = object.body.len(), "S3 PutObject");

        let response = request
            .body(object.body)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use relay_core::store::ServerSideEncryption;
    use secrecy::SecretString;

    use crate::testing::{http_response, serve_canned};

    fn credentials() -> Arc<AwsCredentials> {
        Arc::new(AwsCredentials::new(
            "AKIDEXAMPLE",
            SecretString::from("secret"),
            None,
        ))
    }

    fn transcript_put() -> PutObject {
        PutObject {
            key: "completed_sessions/session-1.json".to_string(),
            body: br#"{"session_id":"session-1"}"#.to_vec(),
            content_type: "application/json".to_string(),
            server_side_encryption: Some(ServerSideEncryption::Aes256),
        }
    }

    #[test]
    fn test_virtual_hosted_endpoint() {
        let store = S3ObjectStore::new(credentials(), "ap-southeast-1", "bias-detection-agent").unwrap();
        assert_eq!(store.host, "bias-detection-agent.s3.ap-southeast-1.amazonaws.com");
        assert_eq!(
            store.object_path("completed_sessions/session-1.json"),
            "/completed_sessions/session-1.json"
        );
    }

    #[test]
    fn test_path_style_and_key_encoding() {
        let store = S3ObjectStore::with_endpoint(
            credentials(),
            "us-east-1",
            "transcripts",
            "http://localhost:9000",
        )
        .unwrap();
        assert_eq!(store.host, "localhost:9000");
        assert_eq!(
            store.object_path("completed_sessions/a b+c.json"),
            "/transcripts/completed_sessions/a%20b%2Bc.json"
        );
    }

    #[tokio::test]
    async fn test_put_object_sends_signed_encrypted_put() {
        let (endpoint, requests) =
            serve_canned(vec![http_response(200, "application/xml", b"")]).await;
        let store =
            S3ObjectStore::with_endpoint(credentials(), "ap-southeast-1", "bucket", &endpoint).unwrap();

        store.put_object(transcript_put()).await.unwrap();

        let requests = requests.await.unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.starts_with("PUT /bucket/completed_sessions/session-1.json HTTP/1.1"));

        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("x-amz-server-side-encryption: aes256"));
        assert!(lower.contains("x-amz-content-sha256: "));
        assert!(lower.contains("/ap-southeast-1/s3/aws4_request"));
        assert!(request.ends_with(r#"{"session_id":"session-1"}"#));
    }

    #[tokio::test]
    async fn test_put_object_error_status() {
        let (endpoint, requests) = serve_canned(vec![http_response(
            403,
            "application/xml",
            b"<Error><Code>AccessDenied</Code></Error>",
        )])
        .await;
        let store =
            S3ObjectStore::with_endpoint(credentials(), "ap-southeast-1", "bucket", &endpoint).unwrap();

        let err = store.put_object(transcript_put()).await.unwrap_err();
        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("AccessDenied"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(requests.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_object_connection_failure() {
        let store = S3ObjectStore::with_endpoint(
            credentials(),
            "ap-southeast-1",
            "bucket",
            "http://127.0.0.1:1",
        )
        .unwrap();
        let err = store.put_object(transcript_put()).await.unwrap_err();
        assert!(matches!(err, StoreError::Http(_)));
    }
}
