//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::blob::BlobOperation;
use crate::error::{FeedStoreError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4) = 16 bytes
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL: one committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The batch, in the order it was committed
    pub operations: Vec<BlobOperation>,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Borrowed view with the same bincode layout as `WalEntry`
#[derive(Serialize)]
struct WalEntryRef<'a> {
    lsn: u64,
    operations: &'a [BlobOperation],
    timestamp: u64,
}

/// Decoded entry header
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl EntryHeader {
    pub(crate) fn decode(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut buf = &bytes[..];
        Self {
            lsn: buf.get_u64_le(),
            crc: buf.get_u32_le(),
            len: buf.get_u32_le(),
        }
    }
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operations: Vec<BlobOperation>) -> Self {
        Self {
            lsn,
            operations,
            timestamp: now_millis(),
        }
    }

    /// Serialize to the framed on-disk form
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Self::encode(self.lsn, &self.operations, self.timestamp)
    }

    /// Frame a batch without taking ownership of it
    pub(crate) fn encode(lsn: u64, operations: &[BlobOperation], timestamp: u64) -> Result<Vec<u8>> {
        let data = bincode::serialize(&WalEntryRef {
            lsn,
            operations,
            timestamp,
        })
        .map_err(|e| FeedStoreError::Serialization(e.to_string()))?;

        let len = u32::try_from(data.len()).map_err(|_| {
            FeedStoreError::WalWrite(format!("entry of {} bytes exceeds frame limit", data.len()))
        })?;

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.put_u64_le(lsn);
        bytes.put_u32_le(crc32fast::hash(&data));
        bytes.put_u32_le(len);
        bytes.put_slice(&data);
        Ok(bytes)
    }

    /// Deserialize from the framed on-disk form, validating length and CRC
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FeedStoreError::WalCorruption(format!(
                "entry too short: {} bytes",
                bytes.len()
            )));
        }

        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&bytes[..HEADER_SIZE]);
        let header = EntryHeader::decode(&header);

        let end = HEADER_SIZE + header.len as usize;
        if bytes.len() < end {
            return Err(FeedStoreError::WalCorruption(format!(
                "entry truncated: expected {} data bytes, found {}",
                header.len,
                bytes.len() - HEADER_SIZE
            )));
        }

        Self::decode_body(header, &bytes[HEADER_SIZE..end])
    }

    /// Validate and decode the data section for an already-read header
    pub(crate) fn decode_body(header: EntryHeader, data: &[u8]) -> Result<Self> {
        let crc = crc32fast::hash(data);
        if crc != header.crc {
            return Err(FeedStoreError::WalCorruption(format!(
                "CRC mismatch at lsn {}: stored {:#010x}, computed {:#010x}",
                header.lsn, header.crc, crc
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| FeedStoreError::WalCorruption(e.to_string()))?;

        if entry.lsn != header.lsn {
            return Err(FeedStoreError::WalCorruption(format!(
                "header lsn {} disagrees with body lsn {}",
                header.lsn, entry.lsn
            )));
        }

        Ok(entry)
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
