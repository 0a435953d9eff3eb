//! Decoders for S3 listing and error documents.
//!
//! Each decoder is an [`EventHandler`], so several of them can share a
//! single pass over a response body through the tuple impl.

use std::collections::HashMap;

use super::{EventHandler, parse};
use crate::{
    error::{Error, Result},
    pagination::Page,
    types::{CopyObjectOutput, ObjectMetadata},
};

/// Collects the text of every element with a given name, matched
/// case-insensitively at any depth. Text of nested children is concatenated.
#[derive(Debug)]
pub struct TextCollector {
    name: String,
    depth: usize,
    current: String,
    values: Vec<String>,
}

impl TextCollector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depth: 0,
            current: String::new(),
            values: Vec::new(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    fn into_first(self) -> Option<String> {
        self.values.into_iter().next().filter(|v| !v.is_empty())
    }
}

impl EventHandler for TextCollector {
    fn start_node(&mut self, name: &str, _: &HashMap<String, String>) -> Result<()> {
        if self.depth > 0 {
            self.depth += 1;
        } else if name.eq_ignore_ascii_case(&self.name) {
            self.depth = 1;
            self.current.clear();
        }
        Ok(())
    }

    fn text(&mut self, value: &str) -> Result<()> {
        if self.depth > 0 {
            self.current.push_str(value);
        }
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        if self.depth > 0 {
            self.depth -= 1;
            if self.depth == 0 {
                self.values.push(std::mem::take(&mut self.current));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectField {
    Key,
    ETag,
    Size,
    LastModified,
}

#[derive(Debug, Default)]
struct ObjectEntry {
    key: Option<String>,
    etag: Option<String>,
    size: Option<String>,
    last_modified: Option<String>,
}

impl ObjectEntry {
    fn slot(&mut self, field: ObjectField) -> &mut Option<String> {
        match field {
            ObjectField::Key => &mut self.key,
            ObjectField::ETag => &mut self.etag,
            ObjectField::Size => &mut self.size,
            ObjectField::LastModified => &mut self.last_modified,
        }
    }

    fn finish(self) -> Result<ObjectMetadata> {
        let key = self
            .key
            .ok_or_else(|| Error::decode("listing entry without Key", None))?;
        let size = self
            .size
            .ok_or_else(|| Error::decode(format!("listing entry {key:?} without Size"), None))?;
        let size = size.trim().parse::<i64>().map_err(|e| {
            Error::decode(
                format!("invalid Size {size:?} for {key:?}"),
                Some(Box::new(e)),
            )
        })?;

        Ok(ObjectMetadata {
            key,
            etag: self.etag.unwrap_or_default(),
            size,
            last_modified: self.last_modified.unwrap_or_default(),
            content_type: None,
            server_side_encryption: None,
        })
    }
}

/// Builds an [`ObjectMetadata`] for every `Contents` element.
#[derive(Debug, Default)]
pub struct ObjectCollector {
    depth: usize,
    contents_depth: Option<usize>,
    field: Option<ObjectField>,
    entry: ObjectEntry,
    objects: Vec<ObjectMetadata>,
}

impl ObjectCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_objects(self) -> Vec<ObjectMetadata> {
        self.objects
    }
}

impl EventHandler for ObjectCollector {
    fn start_node(&mut self, name: &str, _: &HashMap<String, String>) -> Result<()> {
        self.depth += 1;
        match self.contents_depth {
            None if name == "Contents" => {
                self.contents_depth = Some(self.depth);
                self.entry = ObjectEntry::default();
            }
            Some(contents) if self.depth == contents + 1 => {
                self.field = match name {
                    "Key" => Some(ObjectField::Key),
                    "ETag" => Some(ObjectField::ETag),
                    "Size" => Some(ObjectField::Size),
                    "LastModified" => Some(ObjectField::LastModified),
                    _ => None,
                };
                if let Some(field) = self.field {
                    *self.entry.slot(field) = Some(String::new());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, value: &str) -> Result<()> {
        if let (Some(field), Some(contents)) = (self.field, self.contents_depth)
            && self.depth == contents + 1
            && let Some(slot) = self.entry.slot(field)
        {
            slot.push_str(value);
        }
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        if let Some(contents) = self.contents_depth {
            if self.depth == contents + 1 {
                self.field = None;
            } else if self.depth == contents {
                self.contents_depth = None;
                let entry = std::mem::take(&mut self.entry);
                self.objects.push(entry.finish()?);
            }
        }
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CursorField {
    IsTruncated,
    NextContinuationToken,
}

/// Reads `IsTruncated` and `NextContinuationToken` from the root's children.
#[derive(Debug, Default)]
pub struct CursorCollector {
    depth: usize,
    field: Option<CursorField>,
    is_truncated: Option<String>,
    token: Option<String>,
}

impl CursorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cursor for the next page, if the listing is truncated.
    pub fn finish(self) -> Result<Option<String>> {
        let truncated = match self.is_truncated.as_deref().map(str::trim) {
            None => false,
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            Some(v) => {
                return Err(Error::decode(format!("invalid IsTruncated value {v:?}"), None));
            }
        };
        if !truncated {
            return Ok(None);
        }

        match self.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(Some(token)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!("truncated listing without NextContinuationToken; stopping");
                Ok(None)
            }
        }
    }
}

impl EventHandler for CursorCollector {
    fn start_node(&mut self, name: &str, _: &HashMap<String, String>) -> Result<()> {
        self.depth += 1;
        if self.depth == 2 {
            self.field = match name {
                "IsTruncated" => Some(CursorField::IsTruncated),
                "NextContinuationToken" => Some(CursorField::NextContinuationToken),
                _ => None,
            };
            match self.field {
                Some(CursorField::IsTruncated) => self.is_truncated = Some(String::new()),
                Some(CursorField::NextContinuationToken) => self.token = Some(String::new()),
                None => {}
            }
        }
        Ok(())
    }

    fn text(&mut self, value: &str) -> Result<()> {
        if self.depth != 2 {
            return Ok(());
        }
        let slot = match self.field {
            Some(CursorField::IsTruncated) => &mut self.is_truncated,
            Some(CursorField::NextContinuationToken) => &mut self.token,
            None => return Ok(()),
        };
        if let Some(slot) = slot {
            slot.push_str(value);
        }
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        if self.depth == 2 {
            self.field = None;
        }
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }
}

/// Fields of an S3 `<Error>` document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    pub host_id: Option<String>,
}

/// Text of every element named `name`, in document order.
pub fn collect_text(body: &[u8], name: &str) -> Result<Vec<String>> {
    let mut collector = TextCollector::new(name);
    parse(body, &mut collector)?;
    Ok(collector.into_values())
}

/// Every `Contents` entry of a listing.
pub fn decode_objects(body: &[u8]) -> Result<Vec<ObjectMetadata>> {
    let mut collector = ObjectCollector::new();
    parse(body, &mut collector)?;
    Ok(collector.into_objects())
}

/// The continuation token of a truncated listing.
pub fn next_cursor(body: &[u8]) -> Result<Option<String>> {
    let mut collector = CursorCollector::new();
    parse(body, &mut collector)?;
    collector.finish()
}

/// Decodes an error body. Blank or malformed input yields `None`.
pub fn decode_error(body: &[u8]) -> Option<ErrorDocument> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    let mut handler = (
        (TextCollector::new("Code"), TextCollector::new("Message")),
        (TextCollector::new("RequestId"), TextCollector::new("HostId")),
    );
    parse(body, &mut handler).ok()?;

    let ((code, message), (request_id, host_id)) = handler;
    Some(ErrorDocument {
        code: code.into_first(),
        message: message.into_first(),
        request_id: request_id.into_first(),
        host_id: host_id.into_first(),
    })
}

/// One page of a ListObjectsV2 response.
pub fn decode_object_page(body: &[u8]) -> Result<Page<ObjectMetadata>> {
    let mut handler = (ObjectCollector::new(), CursorCollector::new());
    parse(body, &mut handler)?;

    let (objects, cursor) = handler;
    Ok(Page::new(objects.into_objects(), cursor.finish()?))
}

/// One page of a ListBuckets response, as bucket names.
pub fn decode_bucket_page(body: &[u8]) -> Result<Page<String>> {
    let mut handler = (TextCollector::new("Name"), CursorCollector::new());
    parse(body, &mut handler)?;

    let (names, cursor) = handler;
    Ok(Page::new(names.into_values(), cursor.finish()?))
}

/// The `ETag` and `LastModified` of a `CopyObjectResult`.
pub fn decode_copy_result(body: &[u8]) -> Result<CopyObjectOutput> {
    let mut handler = (TextCollector::new("ETag"), TextCollector::new("LastModified"));
    parse(body, &mut handler)?;

    let (etag, last_modified) = handler;
    Ok(CopyObjectOutput {
        etag: etag.into_first(),
        last_modified: last_modified.into_first(),
    })
}
