//! Firebase Storage over its REST API.

use async_trait::async_trait;
use photo_admin_gallery::{ObjectEntry, ObjectRef, ObjectStore, StorageError};
use reqwest::{StatusCode, Url};
use rootcause::prelude::Report;
use serde::Deserialize;
use tracing::{debug, instrument};

const API_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";

/// One page of an object listing.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

/// The object metadata fields used here.
#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

/// Photo store in a Firebase Storage bucket.
pub struct FirebaseStorage {
    client: reqwest::Client,
    objects_url: Url,
    access_token: Option<String>,
}

impl FirebaseStorage {
    /// Creates a client for a bucket.
    pub fn new(bucket: &str, access_token: Option<String>) -> Result<Self, Report<StorageError>> {
        let objects_url = Url::parse(&format!("{API_BASE}/{bucket}/o")).map_err(|e| {
            StorageError::ListFailed {
                prefix: String::new(),
                details: format!("invalid bucket '{bucket}': {e}"),
            }
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            objects_url,
            access_token,
        })
    }

    /// URL of one object; the whole path is a single percent-encoded segment.
    fn object_url(&self, object: &ObjectRef) -> Url {
        let mut url = self.objects_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(object.path());
        }
        url
    }

    fn media_url(&self, object: &ObjectRef, token: Option<&str>) -> Url {
        let mut url = self.object_url(object);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(token) = token {
                query.append_pair("token", token);
            }
        }
        url
    }

    fn list_url(&self, prefix: &str, page_token: Option<&str>) -> Url {
        let mut url = self.objects_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", prefix);
            query.append_pair("delimiter", "/");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn failure_details(status: StatusCode) -> String {
    format!("unexpected status {status}")
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    #[instrument(skip(self))]
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>, Report<StorageError>> {
        let list_failed = |details: String| StorageError::ListFailed {
            prefix: prefix.to_string(),
            details,
        };

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let response = self
                .authorized(self.client.get(self.list_url(prefix, page_token.as_deref())))
                .send()
                .await
                .map_err(|e| list_failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(list_failed(failure_details(response.status())).into());
            }
            let page: ListPage = response
                .json()
                .await
                .map_err(|e| list_failed(e.to_string()))?;

            entries.extend(page.items.into_iter().map(|item| {
                let name = item
                    .name
                    .strip_prefix(prefix)
                    .map(str::to_string)
                    .unwrap_or(item.name);
                ObjectEntry::new(name)
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!(count = entries.len(), "listed objects");
        Ok(entries)
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn display_url(&self, object: &ObjectRef) -> Result<String, Report<StorageError>> {
        let url_failed = |details: String| StorageError::UrlFailed {
            name: object.name().to_string(),
            details,
        };

        let response = self
            .authorized(self.client.get(self.object_url(object)))
            .send()
            .await
            .map_err(|e| url_failed(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: object.name().to_string(),
            }
            .into());
        }
        if !response.status().is_success() {
            return Err(url_failed(failure_details(response.status())).into());
        }
        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| url_failed(e.to_string()))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| url_failed("object has no download token".to_string()))?;

        Ok(self.media_url(object, Some(token)).to_string())
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn raw_blob(&self, object: &ObjectRef) -> Result<Vec<u8>, Report<StorageError>> {
        let fetch_failed = |details: String| StorageError::FetchFailed {
            name: object.name().to_string(),
            details,
        };

        let response = self
            .authorized(self.client.get(self.media_url(object, None)))
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: object.name().to_string(),
            }
            .into());
        }
        if !response.status().is_success() {
            return Err(fetch_failed(failure_details(response.status())).into());
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn delete_object(&self, object: &ObjectRef) -> Result<(), Report<StorageError>> {
        let delete_failed = |details: String| StorageError::DeleteFailed {
            name: object.name().to_string(),
            details,
        };

        let response = self
            .authorized(self.client.delete(self.object_url(object)))
            .send()
            .await
            .map_err(|e| delete_failed(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: object.name().to_string(),
            }
            .into());
        }
        if !response.status().is_success() {
            return Err(delete_failed(failure_details(response.status())).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> FirebaseStorage {
        FirebaseStorage::new("demo.appspot.com", None).expect("client")
    }

    #[test]
    fn object_url_encodes_the_whole_path() {
        let url = storage().object_url(&ObjectRef::photo("a b.jpg"));
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/photos%2Fa%20b.jpg"
        );
    }

    #[test]
    fn media_url_carries_token() {
        let url = storage().media_url(&ObjectRef::photo("a.jpg"), Some("tok"));
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/photos%2Fa.jpg?alt=media&token=tok"
        );
    }

    #[test]
    fn list_url_includes_page_token() {
        let url = storage().list_url("photos/", Some("next"));
        assert_eq!(url.query(), Some("prefix=photos%2F&delimiter=%2F&pageToken=next"));
    }

    #[test]
    fn list_page_parses_without_items() {
        let page: ListPage = serde_json::from_str(r#"{"prefixes": []}"#).expect("parse");
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());

        let page: ListPage = serde_json::from_str(
            r#"{"items": [{"name": "photos/a.jpg", "bucket": "b"}], "nextPageToken": "t"}"#,
        )
        .expect("parse");
        assert_eq!(page.items[0].name, "photos/a.jpg");
        assert_eq!(page.next_page_token.as_deref(), Some("t"));
    }

    #[test]
    fn metadata_parses_download_tokens() {
        let metadata: ObjectMetadata =
            serde_json::from_str(r#"{"name": "photos/a.jpg", "downloadTokens": "t1,t2"}"#)
                .expect("parse");
        assert_eq!(metadata.download_tokens.as_deref(), Some("t1,t2"));
    }
}
