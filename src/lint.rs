// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.


//! Contract checks against a live storage
//!
//! [`Linter`] exercises every operation of a [`BlobStorage`] with throwaway
//! blobs and reports the first behavior that breaks the contract.

use bytes::Bytes;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::adapter::{BlobStorage, Metadata, UploadOptions};
use crate::storage::error::StorageError;
use crate::storage::provider::UrlOptions;

const LINT_CONTENT: &[u8] = b"blob-courier contract check";
const LINT_MIME_TYPE: &str = "text/plain";

/// Errors that can occur while linting a storage
#[derive(Error, Debug)]
pub enum LintError {
    #[error("Check '{check}' failed: {message}")]
    Check {
        check: &'static str,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for lint runs
pub type LintResult<T> = Result<T, LintError>;

fn ensure(check: &'static str, condition: bool, message: impl FnOnce() -> String) -> LintResult<()> {
    if condition {
        Ok(())
    } else {
        Err(LintError::Check {
            check,
            message: message(),
        })
    }
}

/// Runs the storage contract against a [`BlobStorage`].
///
/// `clear` removes every blob under the storage's prefix, so lint a storage
/// scoped to a dedicated prefix or call [`skip_clear`](Self::skip_clear).
#[derive(Debug)]
pub struct Linter<'a> {
    storage: &'a BlobStorage,
    urls: bool,
    clear: bool,
}

impl<'a> Linter<'a> {
    pub fn new(storage: &'a BlobStorage) -> Self {
        Self {
            storage,
            urls: true,
            clear: true,
        }
    }

    /// Skip `url`, `open` and `download`, for backends that cannot sign URLs.
    pub fn skip_urls(mut self) -> Self {
        self.urls = false;
        self
    }

    pub fn skip_clear(mut self) -> Self {
        self.clear = false;
        self
    }

    /// Run all enabled checks and return their names in order.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, or the storage error that interrupted it.
    pub async fn run(&self) -> LintResult<Vec<&'static str>> {
        let id = format!("lint-{}", Uuid::new_v4());
        let copy_id = format!("{}-copy", id);
        let mut passed = Vec::new();

        self.check_upload_read(&id).await?;
        passed.push("upload_read");

        self.check_exists(&id).await?;
        passed.push("exists");

        if self.urls {
            self.check_url(&id).await?;
            passed.push("url");

            self.check_open(&id).await?;
            passed.push("open");

            self.check_download(&id).await?;
            passed.push("download");
        }

        self.check_copy(&id, &copy_id).await?;
        passed.push("copy");

        self.check_delete(&id).await?;
        self.storage.delete(&copy_id).await?;
        passed.push("delete");

        if self.clear {
            self.check_clear(&id).await?;
            passed.push("clear");
        }

        info!(
            "Lint passed for directory={}, prefix={:?}, checks={}",
            self.storage.directory().name(),
            self.storage.prefix(),
            passed.join(",")
        );
        Ok(passed)
    }

    async fn check_upload_read(&self, id: &str) -> LintResult<()> {
        let mut metadata = Metadata::new();
        metadata.insert("mime_type".to_string(), json!(LINT_MIME_TYPE));

        self.storage
            .upload(LINT_CONTENT, id, Some(&metadata), UploadOptions::new())
            .await?;
        let body = self.storage.read(id).await?;
        ensure("upload_read", body == LINT_CONTENT, || {
            format!("read returned {} bytes that differ from the upload", body.len())
        })?;
        debug!("Check upload_read passed for id={}", id);
        Ok(())
    }

    async fn check_exists(&self, id: &str) -> LintResult<()> {
        let missing = format!("{}-missing", id);
        ensure("exists", !self.storage.exists(&missing).await?, || {
            format!("exists is true for never uploaded id={}", missing)
        })?;
        ensure("exists", self.storage.exists(id).await?, || {
            format!("exists is false after upload of id={}", id)
        })
    }

    async fn check_url(&self, id: &str) -> LintResult<()> {
        let url = self.storage.url(id, &UrlOptions::default()).await?;
        let parsed = Url::parse(&url).map_err(|e| LintError::Check {
            check: "url",
            message: format!("'{}' is not a URL: {}", url, e),
        })?;

        if self.storage.is_public() {
            ensure("url", parsed.query().is_none(), || {
                format!("public URL carries a query: {}", url)
            })
        } else {
            ensure(
                "url",
                parsed.query().is_some_and(|query| !query.is_empty()),
                || format!("signed URL has no query: {}", url),
            )
        }
    }

    async fn check_open(&self, id: &str) -> LintResult<()> {
        let mut file = self.storage.open(id).await?;
        let head = file.read(5).await?;
        let tail = file.read_to_end().await?;
        let body: Vec<u8> = head.iter().chain(tail.iter()).copied().collect();
        ensure("open", body == LINT_CONTENT, || {
            format!("opened stream returned {} bytes that differ from the upload", body.len())
        })
    }

    async fn check_download(&self, id: &str) -> LintResult<()> {
        let downloaded = self.storage.download(id).await?;
        let body = downloaded.read_all()?;
        ensure("download", Bytes::from(body) == LINT_CONTENT, || {
            "downloaded content differs from the upload".to_string()
        })?;

        // Local storage does not persist content types
        match downloaded.content_type() {
            Some(content_type) => ensure("download", content_type == LINT_MIME_TYPE, || {
                format!(
                    "content type is '{}', expected '{}'",
                    content_type, LINT_MIME_TYPE
                )
            }),
            None => Ok(()),
        }
    }

    async fn check_copy(&self, id: &str, copy_id: &str) -> LintResult<()> {
        self.storage
            .upload(self.storage.stored(id), copy_id, None, UploadOptions::new())
            .await?;
        ensure("copy", self.storage.exists(copy_id).await?, || {
            format!("copy target id={} does not exist", copy_id)
        })?;
        let body = self.storage.read(copy_id).await?;
        ensure("copy", body == LINT_CONTENT, || {
            "copied content differs from the source".to_string()
        })
    }

    async fn check_delete(&self, id: &str) -> LintResult<()> {
        self.storage.delete(id).await?;
        ensure("delete", !self.storage.exists(id).await?, || {
            format!("id={} still exists after delete", id)
        })?;
        // Deleting again must not fail
        self.storage.delete(id).await?;
        Ok(())
    }

    async fn check_clear(&self, id: &str) -> LintResult<()> {
        self.storage
            .upload(LINT_CONTENT, id, None, UploadOptions::new())
            .await?;
        self.storage.clear().await?;
        ensure("clear", !self.storage.exists(id).await?, || {
            format!("id={} still exists after clear", id)
        })
    }
}
