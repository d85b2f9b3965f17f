//! Image body download.

use crate::descriptor::ImageDescriptor;
use crate::error::TransferError;
use crate::http::HttpClient;

/// Downloads the bytes behind an `ImageDescriptor`.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    http: HttpClient,
}

impl ContentFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// GET the image and return the full body.
    ///
    /// A non-200 status is logged but whatever was received is returned
    /// (unless the client is strict).
    pub fn fetch(&self, descriptor: &ImageDescriptor) -> Result<Vec<u8>, TransferError> {
        let response = self.http.get(descriptor.url(), &[]).map_err(|e| {
            tracing::error!(image = %descriptor, "error while getting image: {}", e);
            e
        })?;
        if !response.is_ok() {
            tracing::error!(
                image = %descriptor,
                status = response.status,
                "failed to retrieve image content"
            );
        }
        Ok(response.body)
    }
}
