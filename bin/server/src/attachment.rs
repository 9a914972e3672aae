//! Hands a downloaded photo back to the browser.

use async_trait::async_trait;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use photo_admin_gallery::{SaveTarget, StorageError};
use rootcause::prelude::Report;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct SavedFile {
    name: String,
    content: Vec<u8>,
}

/// Save target that turns the saved photo into an HTTP attachment.
///
/// One is created per download request; the browser saves the response
/// under the photo's name.
#[derive(Debug, Default)]
pub struct Attachment {
    file: Mutex<Option<SavedFile>>,
}

impl Attachment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn file(&self) -> MutexGuard<'_, Option<SavedFile>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the attachment response, or `None` if nothing was saved.
    #[must_use]
    pub fn into_download(self) -> Option<Response> {
        let file = self
            .file
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)?;
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            file_name(&file.name)
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        Some(
            (
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/octet-stream"),
                    ),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.content,
            )
                .into_response(),
        )
    }
}

/// Last path component of `name`, reduced to characters that are safe in a
/// quoted header parameter.
fn file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl SaveTarget for Attachment {
    async fn save_as(&self, suggested_name: &str, content: &[u8]) -> Result<(), Report<StorageError>> {
        debug!(name = suggested_name, bytes = content.len(), "attachment ready");
        *self.file() = Some(SavedFile {
            name: suggested_name.to_string(),
            content: content.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec()
    }

    #[tokio::test]
    async fn saved_photo_becomes_an_attachment() {
        let attachment = Attachment::new();
        attachment.save_as("a.jpg", b"jpeg").await.expect("save");

        let response = attachment.into_download().expect("response");

        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.jpg\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(body(response).await, b"jpeg");
    }

    #[test]
    fn nothing_saved_means_no_response() {
        assert!(Attachment::new().into_download().is_none());
    }

    #[test]
    fn file_name_is_reduced_to_a_safe_component() {
        assert_eq!(file_name("2024-01-01 (1).jpg"), "2024-01-01 (1).jpg");
        assert_eq!(file_name("../up/b.jpg"), "b.jpg");
        assert_eq!(file_name("say \"hi\".jpg"), "say _hi_.jpg");
        assert_eq!(file_name("año.jpg"), "a_o.jpg");
        assert_eq!(file_name(".."), "photo");
    }
}
