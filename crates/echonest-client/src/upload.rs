// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use reqwest::multipart::Part;
use std::path::Path;

/// A named payload sent as a file part of a multipart POST (for example the
/// `track` field of `track/upload`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    data: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory bytes; `name` supplies the part's file name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base name of [`UploadFile::name`], used as the multipart file name.
    pub fn file_name(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn into_part(self) -> Part {
        let file_name = self.file_name();
        Part::bytes(self.data).file_name(file_name)
    }
}
