//! ObjectStore trait and its type-erased wrapper.
//!
//! `ObjectStore` uses RPITIT, so it cannot be a trait object directly.
//! Follows the usual blanket-impl pattern:
//! 1. Define an object-safe `ObjectStoreDyn` trait with boxed futures
//! 2. Blanket-impl `ObjectStoreDyn` for all `T: ObjectStore`
//! 3. `BoxObjectStore` wraps `Box<dyn ObjectStoreDyn>` and delegates

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use relay_types::error::StoreError;

/// Server-side encryption requested for a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSideEncryption {
    /// Store-managed keys, AES-256.
    Aes256,
}

impl ServerSideEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerSideEncryption::Aes256 => "AES256",
        }
    }
}

impl fmt::Display for ServerSideEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub server_side_encryption: Option<ServerSideEncryption>,
}

/// Write-only view of a durable object store.
///
/// Implementations live in relay-infra (e.g., `S3ObjectStore`).
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    /// Write `object`, replacing whatever was stored under the same key.
    fn put_object(
        &self,
        object: PutObject,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Object-safe version of [`ObjectStore`] with boxed futures.
pub trait ObjectStoreDyn: Send + Sync {
    fn name(&self) -> &str;

    fn put_object_boxed(
        &self,
        object: PutObject,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}

impl<T: ObjectStore> ObjectStoreDyn for T {
    fn name(&self) -> &str {
        ObjectStore::name(self)
    }

    fn put_object_boxed(
        &self,
        object: PutObject,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(self.put_object(object))
    }
}

/// Type-erased object store, injected into the archiver at startup.
pub struct BoxObjectStore {
    inner: Box<dyn ObjectStoreDyn + Send + Sync>,
}

impl BoxObjectStore {
    pub fn new<T: ObjectStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        self.inner.put_object_boxed(object).await
    }
}
