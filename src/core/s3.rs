//! Blob transfer client for document content
//!
//! Document bytes never travel through the API itself: uploads go to a
//! pre-signed storage endpoint as a multipart POST, downloads come straight
//! from a result URL. The pre-signed field mapping is opaque to this layer.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::multipart::Form;
use tracing::debug;

use crate::core::errors::Result;
use crate::core::transport::{wrap_multipart_file, FileInput};

/// Upload/download contract over a pre-signed object-storage protocol
#[async_trait]
pub(crate) trait BlobTransfer: Send + Sync + std::fmt::Debug {
    /// POST a multipart form of the pre-signed fields plus the file content
    async fn upload(
        &self,
        url: &str,
        fields: &HashMap<String, String>,
        file: FileInput,
    ) -> Result<()>;

    /// GET raw result bytes
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blob client sharing a keep-alive connection pool
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub(crate) struct S3Client {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl S3Client {
    /// Create a pooled blob client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(std::time::Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl BlobTransfer for S3Client {
    async fn upload(
        &self,
        url: &str,
        fields: &HashMap<String, String>,
        file: FileInput,
    ) -> Result<()> {
        upload_via(&self.client, url, fields, file).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        download_via(&self.client, url).await
    }
}

/// Fetch-style blob client used on wasm targets
#[derive(Debug)]
pub(crate) struct FetchS3Client {
    client: reqwest::Client,
}

impl FetchS3Client {
    /// Create a plain blob client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BlobTransfer for FetchS3Client {
    async fn upload(
        &self,
        url: &str,
        fields: &HashMap<String, String>,
        file: FileInput,
    ) -> Result<()> {
        upload_via(&self.client, url, fields, file).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        download_via(&self.client, url).await
    }
}

/// Pick the blob client variant for the current platform
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn create() -> Result<std::sync::Arc<dyn BlobTransfer>> {
    Ok(std::sync::Arc::new(S3Client::new()?))
}

/// Pick the blob client variant for the current platform
#[cfg(target_arch = "wasm32")]
pub(crate) fn create() -> Result<std::sync::Arc<dyn BlobTransfer>> {
    Ok(std::sync::Arc::new(FetchS3Client::new()))
}

async fn upload_via(
    client: &reqwest::Client,
    url: &str,
    fields: &HashMap<String, String>,
    file: FileInput,
) -> Result<()> {
    let mut form = Form::new();
    for (key, value) in fields {
        form = form.text(key.clone(), value.clone());
    }
    form = form.part("file", wrap_multipart_file(file).await?);

    debug!("uploading blob to storage");
    client
        .post(url)
        .multipart(form)
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}

async fn download_via(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    debug!("downloading blob from storage");
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_client_creation() {
        assert!(S3Client::new().is_ok());
        let _ = FetchS3Client::new();
    }
}
