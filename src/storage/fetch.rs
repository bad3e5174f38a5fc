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


//! Retrieval of blob content through URLs
//!
//! [`Fetcher`] is the seam between the adapter and whatever speaks HTTP. The
//! adapter only hands it URLs produced by the directory's signer.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use super::error::{StorageError, StorageResult};

/// Lazily streamed remote content.
///
/// Chunks are pulled from the underlying stream only when requested, so
/// partial reads never materialize the whole object.
pub struct RemoteFile {
    url: Url,
    content_length: Option<u64>,
    content_type: Option<String>,
    stream: BoxStream<'static, StorageResult<Bytes>>,
    // unread tail of the last chunk split by `read`
    buffer: Bytes,
}

impl RemoteFile {
    pub fn new(
        url: Url,
        content_length: Option<u64>,
        content_type: Option<String>,
        stream: BoxStream<'static, StorageResult<Bytes>>,
    ) -> Self {
        Self {
            url,
            content_length,
            content_type,
            stream,
            buffer: Bytes::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Next chunk of content, or `None` at the end of the stream.
    pub async fn next_chunk(&mut self) -> StorageResult<Option<Bytes>> {
        if !self.buffer.is_empty() {
            return Ok(Some(std::mem::take(&mut self.buffer)));
        }
        self.stream.next().await.transpose()
    }

    /// Read up to `len` bytes. Fewer bytes are returned only at the end of
    /// the stream.
    pub async fn read(&mut self, len: usize) -> StorageResult<Bytes> {
        let mut out = BytesMut::with_capacity(len);
        while out.len() < len {
            let Some(mut chunk) = self.next_chunk().await? else {
                break;
            };
            let wanted = len - out.len();
            if chunk.len() > wanted {
                self.buffer = chunk.split_off(wanted);
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }

    pub async fn read_to_end(mut self) -> StorageResult<Bytes> {
        let mut out = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }

    /// Remaining content as a stream, starting with any unread buffered bytes.
    pub fn into_stream(self) -> BoxStream<'static, StorageResult<Bytes>> {
        let head = (!self.buffer.is_empty()).then_some(Ok(self.buffer));
        stream::iter(head).chain(self.stream).boxed()
    }

    /// Write the remaining content into a temporary file.
    pub async fn into_tempfile(mut self) -> StorageResult<DownloadedFile> {
        let file = tempfile::Builder::new()
            .prefix("blob-courier-")
            .tempfile()?;
        // Chunks are written through tokio so the runtime threads never block
        let mut writer = tokio::fs::File::from_std(file.reopen()?);
        let mut size = 0u64;
        while let Some(chunk) = self.next_chunk().await? {
            writer.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        writer.flush().await?;

        debug!(
            "Downloaded url={} into path={}, size={}",
            self.url,
            file.path().display(),
            size
        );
        Ok(DownloadedFile {
            file,
            size,
            content_type: self.content_type,
        })
    }
}

impl Debug for RemoteFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RemoteFile")
            .field("url", &self.url.as_str())
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Content fully downloaded into a temporary file, removed on drop.
#[derive(Debug)]
pub struct DownloadedFile {
    file: NamedTempFile,
    size: u64,
    content_type: Option<String>,
}

impl DownloadedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn read_all(&self) -> StorageResult<Vec<u8>> {
        Ok(fs::read(self.file.path())?)
    }

    pub fn into_temp_file(self) -> NamedTempFile {
        self.file
    }
}

/// Retrieves content behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Open a lazy stream over the content at `url`.
    async fn open(&self, url: &Url) -> StorageResult<RemoteFile>;

    /// Download the complete content at `url` into a temporary file.
    async fn download(&self, url: &Url) -> StorageResult<DownloadedFile> {
        self.open(url).await?.into_tempfile().await
    }
}

/// [`Fetcher`] over plain HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn open(&self, url: &Url) -> StorageResult<RemoteFile> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let content_length = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(StorageError::from))
            .boxed();

        Ok(RemoteFile::new(
            url.clone(),
            content_length,
            content_type,
            stream,
        ))
    }
}
