//! Journal file framing
//!
//! ```text
//! ┌──────────┬──────────┬──────────────┐
//! │ Len (4)  │ CRC (4)  │ Entry (Len)  │  ... repeated
//! └──────────┴──────────┴──────────────┘
//! ```
//!
//! A frame that is cut short or fails its CRC ends the readable log.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FeedStoreError, Result};

/// Len (4) + CRC (4)
pub(crate) const FRAME_HEADER_SIZE: usize = 8;

/// Frames decoded from one file
#[derive(Debug, Default)]
pub(crate) struct DecodedFrames {
    pub entries: Vec<Vec<u8>>,

    /// Byte length of the valid prefix
    pub valid_len: u64,

    /// Whether anything followed the valid prefix
    pub torn: bool,
}

/// Append one framed entry to `buf`
pub(crate) fn encode_frame(buf: &mut BytesMut, entry: &[u8]) -> Result<()> {
    let len = u32::try_from(entry.len()).map_err(|_| {
        FeedStoreError::Commit(format!("journal entry of {} bytes is too large", entry.len()))
    })?;
    buf.reserve(FRAME_HEADER_SIZE + entry.len());
    buf.put_u32_le(len);
    buf.put_u32_le(crc32fast::hash(entry));
    buf.put_slice(entry);
    Ok(())
}

/// Frame every entry into one buffer
pub(crate) fn encode_frames<'a>(entries: impl IntoIterator<Item = &'a [u8]>) -> Result<BytesMut> {
    let mut buf = BytesMut::new();
    for entry in entries {
        encode_frame(&mut buf, entry)?;
    }
    Ok(buf)
}

/// Decode frames up to the first torn or corrupt one
pub(crate) fn decode_frames(mut data: &[u8]) -> DecodedFrames {
    let mut decoded = DecodedFrames::default();

    while data.has_remaining() {
        if data.remaining() < FRAME_HEADER_SIZE {
            decoded.torn = true;
            break;
        }
        let len = data.get_u32_le() as usize;
        let crc = data.get_u32_le();

        if data.remaining() < len || crc32fast::hash(&data[..len]) != crc {
            decoded.torn = true;
            break;
        }

        decoded.entries.push(data[..len].to_vec());
        data.advance(len);
        decoded.valid_len += (FRAME_HEADER_SIZE + len) as u64;
    }

    decoded
}
