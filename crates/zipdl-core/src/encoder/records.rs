//! Byte layout of the ZIP records written by the streaming encoder.
//!
//! Entries are stored (no compression) with general-purpose flag bit 3 set, so
//! CRC and sizes follow the data in a data descriptor and the local header can
//! be written before the body is known.

use bytes::{BufMut, BytesMut};
use chrono::{Datelike, NaiveDateTime, Timelike};

pub const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4b50;
pub const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

/// 2.0: stored entries with data descriptors.
const VERSION_NEEDED: u16 = 20;
/// Made by Unix (3), ZIP format version 2.0.
const VERSION_MADE_BY: u16 = (3 << 8) | 20;
/// Bit 3: sizes in data descriptor. Bit 11: name is UTF-8.
const FLAGS: u16 = 0x0008 | 0x0800;
const METHOD_STORED: u16 = 0;
/// Regular file, rw-r--r--.
const EXTERNAL_ATTRS: u32 = 0o100644 << 16;

pub const LOCAL_HEADER_LEN: usize = 30;
pub const DATA_DESCRIPTOR_LEN: usize = 16;
pub const CENTRAL_HEADER_LEN: usize = 46;
pub const END_OF_CENTRAL_DIR_LEN: usize = 22;

/// MS-DOS date and time as stored in ZIP headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// Converts a local timestamp. DOS dates start in 1980; earlier values clamp
    /// to 1980-01-01 00:00 and seconds have two-second resolution.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        if dt.year() < 1980 {
            return Self {
                time: 0,
                date: (1 << 5) | 1,
            };
        }
        let year = (dt.year() - 1980).min(127) as u16;
        let date = (year << 9) | ((dt.month() as u16) << 5) | dt.day() as u16;
        let time =
            ((dt.hour() as u16) << 11) | ((dt.minute() as u16) << 5) | (dt.second() as u16 / 2);
        Self { time, date }
    }
}

/// What the central directory needs to know about one written entry.
#[derive(Debug, Clone)]
pub struct CentralRecord {
    pub name: String,
    pub crc32: u32,
    pub size: u32,
    pub local_header_offset: u32,
}

pub fn local_header(name: &str, stamp: DosDateTime) -> BytesMut {
    let mut buf = BytesMut::with_capacity(LOCAL_HEADER_LEN + name.len());
    buf.put_u32_le(LOCAL_HEADER_SIG);
    buf.put_u16_le(VERSION_NEEDED);
    buf.put_u16_le(FLAGS);
    buf.put_u16_le(METHOD_STORED);
    buf.put_u16_le(stamp.time);
    buf.put_u16_le(stamp.date);
    // crc32, compressed size, uncompressed size: deferred to the data descriptor
    buf.put_u32_le(0);
    buf.put_u32_le(0);
    buf.put_u32_le(0);
    buf.put_u16_le(name.len() as u16);
    buf.put_u16_le(0);
    buf.put_slice(name.as_bytes());
    buf
}

pub fn data_descriptor(crc32: u32, size: u32) -> BytesMut {
    let mut buf = BytesMut::with_capacity(DATA_DESCRIPTOR_LEN);
    buf.put_u32_le(DATA_DESCRIPTOR_SIG);
    buf.put_u32_le(crc32);
    buf.put_u32_le(size);
    buf.put_u32_le(size);
    buf
}

pub fn central_header(rec: &CentralRecord, stamp: DosDateTime) -> BytesMut {
    let mut buf = BytesMut::with_capacity(CENTRAL_HEADER_LEN + rec.name.len());
    buf.put_u32_le(CENTRAL_HEADER_SIG);
    buf.put_u16_le(VERSION_MADE_BY);
    buf.put_u16_le(VERSION_NEEDED);
    buf.put_u16_le(FLAGS);
    buf.put_u16_le(METHOD_STORED);
    buf.put_u16_le(stamp.time);
    buf.put_u16_le(stamp.date);
    buf.put_u32_le(rec.crc32);
    buf.put_u32_le(rec.size);
    buf.put_u32_le(rec.size);
    buf.put_u16_le(rec.name.len() as u16);
    buf.put_u16_le(0); // extra
    buf.put_u16_le(0); // comment
    buf.put_u16_le(0); // disk number start
    buf.put_u16_le(0); // internal attrs
    buf.put_u32_le(EXTERNAL_ATTRS);
    buf.put_u32_le(rec.local_header_offset);
    buf.put_slice(rec.name.as_bytes());
    buf
}

pub fn end_of_central_directory(entries: u16, cd_size: u32, cd_offset: u32) -> BytesMut {
    let mut buf = BytesMut::with_capacity(END_OF_CENTRAL_DIR_LEN);
    buf.put_u32_le(END_OF_CENTRAL_DIR_SIG);
    buf.put_u16_le(0);
    buf.put_u16_le(0);
    buf.put_u16_le(entries);
    buf.put_u16_le(entries);
    buf.put_u32_le(cd_size);
    buf.put_u32_le(cd_offset);
    buf.put_u16_le(0);
    buf
}
