//! Structured access to patch metadata
//!
//! The format treats metadata as opaque bytes. In practice patch tools store
//! a small JSON object there (creation date, content hash, author), so this
//! view offers text and JSON accessors on top of the raw bytes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PatchError, Result};

/// Read-only view over a patch's metadata block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataView<'a> {
    raw: &'a [u8],
}

impl<'a> MetadataView<'a> {
    pub const fn new(raw: &'a [u8]) -> Self {
        Self { raw }
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }

    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Metadata as UTF-8 text
    pub fn as_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.raw).map_err(|_| PatchError::MetadataEncoding)
    }

    /// Metadata parsed as JSON, `None` when the block is empty
    pub fn json(&self) -> Result<Option<Value>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(self.as_str()?)?))
    }

    /// Deserialize the metadata into a caller-defined type
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(self.as_str()?)?)
    }

    /// Look up a top-level key of a JSON object
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .json()?
            .and_then(|mut value| value.get_mut(key).map(Value::take)))
    }
}

impl crate::PatchFile {
    /// Metadata view of this patch
    pub fn metadata(&self) -> Result<MetadataView<'_>> {
        Ok(MetadataView::new(self.patch()?.metadata()))
    }
}
