use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::io;

/// Streamed content of one archive entry.
pub type EntryBody = BoxStream<'static, io::Result<Bytes>>;

/// A named unit handed from the producer to the encoder. The body is not read
/// until the encoder writes the entry; ownership moves with the entry.
pub struct ArchiveEntry {
    name: String,
    body: EntryBody,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, body: EntryBody) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Entry with in-memory content, delivered as a single chunk.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        Self::new(name, stream::once(async move { Ok(data) }).boxed())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_parts(self) -> (String, EntryBody) {
        (self.name, self.body)
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
