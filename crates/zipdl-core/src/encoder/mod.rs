//! Streaming ZIP encoder: named byte-stream entries in, ZIP container bytes out.
//!
//! Each entry is written as local header, raw body, data descriptor, so
//! nothing about an entry has to be known before its body starts flowing.
//! `finish` appends the central directory. Writes go straight to the
//! underlying `AsyncWrite`; a slow destination slows the encoder down, which
//! in turn delays the next pull demand on the producer.

mod entry;
mod records;

pub use entry::{ArchiveEntry, EntryBody};

use chrono::NaiveDateTime;
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::control::DownloadControl;
use crate::error::ZipStreamError;
use records::{CentralRecord, DosDateTime};

/// Largest entry count a ZIP32 end record can state without meaning ZIP64.
const MAX_ENTRIES: usize = u16::MAX as usize - 1;

/// Streaming ZIP writer over any async byte sink.
pub struct ZipEncoder<W> {
    writer: W,
    offset: u64,
    records: Vec<CentralRecord>,
    stamp: DosDateTime,
    control: DownloadControl,
}

impl<W: AsyncWrite + Unpin> ZipEncoder<W> {
    /// New encoder stamping entries with the current local time.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            offset: 0,
            records: Vec::new(),
            stamp: DosDateTime::from_naive(chrono::Local::now().naive_local()),
            control: DownloadControl::default(),
        }
    }

    pub fn with_timestamp(mut self, modified: NaiveDateTime) -> Self {
        self.stamp = DosDateTime::from_naive(modified);
        self
    }

    /// Abort token checked between body chunks.
    pub fn with_control(mut self, control: DownloadControl) -> Self {
        self.control = control;
        self
    }

    /// Bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Writes one entry, consuming its body to the end. Returns the body size.
    pub async fn write_entry(&mut self, entry: ArchiveEntry) -> Result<u64, ZipStreamError> {
        // 0xFFFF in the end record means "see ZIP64"
        if self.records.len() >= MAX_ENTRIES {
            return Err(ZipStreamError::Limit("more than 65534 entries"));
        }
        let (name, mut body) = entry.into_parts();
        if name.len() > u16::MAX as usize {
            return Err(ZipStreamError::Limit("entry name longer than 65535 bytes"));
        }
        let local_header_offset = zip32(self.offset, "archive larger than 4 GiB")?;

        self.emit(&records::local_header(&name, self.stamp)).await?;

        let mut hasher = crc32fast::Hasher::new();
        let mut size: u64 = 0;
        while let Some(chunk) = body.next().await {
            if self.control.is_aborted() {
                return Err(ZipStreamError::Aborted);
            }
            let chunk = chunk.map_err(|source| ZipStreamError::Body {
                name: name.clone(),
                source,
            })?;
            size += chunk.len() as u64;
            if size > u32::MAX as u64 {
                return Err(ZipStreamError::Limit("entry larger than 4 GiB"));
            }
            hasher.update(&chunk);
            self.emit(&chunk).await?;
        }

        let crc32 = hasher.finalize();
        self.emit(&records::data_descriptor(crc32, size as u32)).await?;
        self.records.push(CentralRecord {
            name,
            crc32,
            size: size as u32,
            local_header_offset,
        });
        Ok(size)
    }

    /// Writes the central directory, flushes, and hands back the writer
    /// together with the total archive size.
    pub async fn finish(mut self) -> Result<(W, u64), ZipStreamError> {
        let cd_offset = zip32(self.offset, "archive larger than 4 GiB")?;
        let written = std::mem::take(&mut self.records);

        for rec in &written {
            self.emit(&records::central_header(rec, self.stamp)).await?;
        }
        let cd_size = zip32(self.offset - cd_offset as u64, "central directory larger than 4 GiB")?;

        self.emit(&records::end_of_central_directory(
            written.len() as u16,
            cd_size,
            cd_offset,
        ))
        .await?;
        self.writer.flush().await.map_err(ZipStreamError::Sink)?;
        Ok((self.writer, self.offset))
    }

    async fn emit(&mut self, buf: &[u8]) -> Result<(), ZipStreamError> {
        self.writer
            .write_all(buf)
            .await
            .map_err(ZipStreamError::Sink)?;
        self.offset += buf.len() as u64;
        Ok(())
    }
}

fn zip32(value: u64, what: &'static str) -> Result<u32, ZipStreamError> {
    u32::try_from(value).map_err(|_| ZipStreamError::Limit(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;
    use std::io::{self, Cursor, Read};

    fn read_back(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_archive_is_just_end_record() {
        let (out, size) = ZipEncoder::new(Vec::new()).finish().await.unwrap();
        assert_eq!(size, records::END_OF_CENTRAL_DIR_LEN as u64);
        assert_eq!(out.len(), records::END_OF_CENTRAL_DIR_LEN);
        assert!(read_back(out).is_empty());
    }

    #[tokio::test]
    async fn entries_read_back_in_order() {
        let mut enc = ZipEncoder::new(Vec::new());
        enc.write_entry(ArchiveEntry::from_bytes("a.txt", "alpha")).await.unwrap();
        enc.write_entry(ArchiveEntry::from_bytes("dir/b.txt", "")).await.unwrap();
        enc.write_entry(ArchiveEntry::from_bytes("c.bin", vec![0u8, 1, 2, 255]))
            .await
            .unwrap();
        assert_eq!(enc.entry_count(), 3);
        let (out, size) = enc.finish().await.unwrap();
        assert_eq!(size, out.len() as u64);

        let entries = read_back(out);
        assert_eq!(
            entries,
            vec![
                ("a.txt".to_string(), b"alpha".to_vec()),
                ("dir/b.txt".to_string(), Vec::new()),
                ("c.bin".to_string(), vec![0u8, 1, 2, 255]),
            ]
        );
    }

    #[tokio::test]
    async fn multi_chunk_body_is_concatenated() {
        let chunks: Vec<io::Result<Bytes>> = (0..10u8)
            .map(|i| Ok(Bytes::from(vec![i; 1000])))
            .collect();
        let mut enc = ZipEncoder::new(Vec::new());
        let size = enc
            .write_entry(ArchiveEntry::new("big.bin", stream::iter(chunks).boxed()))
            .await
            .unwrap();
        assert_eq!(size, 10_000);
        let entries = read_back(enc.finish().await.unwrap().0);
        let expected: Vec<u8> = (0..10u8).flat_map(|i| vec![i; 1000]).collect();
        assert_eq!(entries[0].1, expected);
    }

    #[tokio::test]
    async fn body_error_is_encoding_failure() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let mut enc = ZipEncoder::new(Vec::new());
        let err = enc
            .write_entry(ArchiveEntry::new("x", stream::iter(chunks).boxed()))
            .await
            .unwrap_err();
        assert!(matches!(err, ZipStreamError::Body { ref name, .. } if name == "x"));
        assert_eq!(err.kind(), crate::error::ErrorKind::Encoding);
    }

    #[tokio::test]
    async fn abort_stops_between_chunks() {
        let control = DownloadControl::new();
        control.request_abort();
        let mut enc = ZipEncoder::new(Vec::new()).with_control(control);
        let err = enc
            .write_entry(ArchiveEntry::from_bytes("a", "data"))
            .await
            .unwrap_err();
        assert!(matches!(err, ZipStreamError::Aborted));
    }

    #[tokio::test]
    async fn timestamp_and_offsets_are_deterministic() {
        let modified = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(13, 45, 30)
            .unwrap();
        let mut enc = ZipEncoder::new(Vec::new()).with_timestamp(modified);
        enc.write_entry(ArchiveEntry::from_bytes("a.txt", "alpha")).await.unwrap();
        let first = (records::LOCAL_HEADER_LEN + 5 + 5 + records::DATA_DESCRIPTOR_LEN) as u64;
        assert_eq!(enc.bytes_written(), first);
        enc.write_entry(ArchiveEntry::from_bytes("b", "")).await.unwrap();
        assert_eq!(
            enc.bytes_written(),
            first + (records::LOCAL_HEADER_LEN + 1 + records::DATA_DESCRIPTOR_LEN) as u64
        );

        let (out, _) = enc.finish().await.unwrap();
        let time = u16::from_le_bytes([out[10], out[11]]);
        let date = u16::from_le_bytes([out[12], out[13]]);
        assert_eq!(time, (13 << 11) | (45 << 5) | 15);
        assert_eq!(date, (44 << 9) | (3 << 5) | 15);
    }

    #[tokio::test]
    async fn entry_count_stops_below_zip64_marker() {
        let mut enc = ZipEncoder::new(Vec::new());
        let filler = CentralRecord {
            name: "f".into(),
            crc32: 0,
            size: 0,
            local_header_offset: 0,
        };
        enc.records = vec![filler; MAX_ENTRIES - 1];
        enc.write_entry(ArchiveEntry::from_bytes("last", "")).await.unwrap();
        assert_eq!(enc.entry_count(), 65534);

        let err = enc
            .write_entry(ArchiveEntry::from_bytes("one-too-many", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ZipStreamError::Limit(_)));
        assert_eq!(enc.entry_count(), 65534);
    }

    #[tokio::test]
    async fn utf8_names_survive() {
        let mut enc = ZipEncoder::new(Vec::new());
        enc.write_entry(ArchiveEntry::from_bytes("résumé/ファイル.txt", "x"))
            .await
            .unwrap();
        let entries = read_back(enc.finish().await.unwrap().0);
        assert_eq!(entries[0].0, "résumé/ファイル.txt");
    }
}
