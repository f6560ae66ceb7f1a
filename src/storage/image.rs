//! Layout of the settings image.
//!
//! ```text
//! 0      magic "FC" (2 bytes)
//! 2      format version (1 byte)
//! 3      reserved (1 byte)
//! 4      records: group id (u16 BE), group version (u8), payload length (u16 BE), payload
//! ...    end marker: group id 0
//! ...    zero padding
//! N-2    X25 CRC over bytes 0..N-2 (u16 BE)
//! ```

use crc::{Crc, CRC_16_IBM_SDLC};
use log::*;

use super::StorageError;
use crate::registry::{self, GroupId, GROUPS, GROUP_COUNT};
use crate::settings::Settings;
use crate::target::Target;

const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

pub const IMAGE_SIZE: usize = 4096;
pub const MAGIC: [u8; 2] = *b"FC";
pub const FORMAT_VERSION: u8 = 1;

const HEADER_SIZE: usize = 4;
const RECORD_HEADER_SIZE: usize = 5;
const CRC_OFFSET: usize = IMAGE_SIZE - 2;
const END_MARKER: u16 = 0;

pub type Image = [u8; IMAGE_SIZE];

struct Record<'a> {
    id: u16,
    version: u8,
    payload: &'a [u8],
}

/// Iterates over the group records, yielding an error for a record reaching into the checksum.
struct Records<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, ()>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let header = self.data.get(self.offset..self.offset + RECORD_HEADER_SIZE);
        let Some(header) = header else {
            // no room left for an end marker
            self.done = true;
            return Some(Err(()));
        };

        let id = u16::from_be_bytes([header[0], header[1]]);
        if id == END_MARKER {
            self.done = true;
            return None;
        }

        let version = header[2];
        let len = u16::from_be_bytes([header[3], header[4]]) as usize;
        let start = self.offset + RECORD_HEADER_SIZE;
        let Some(payload) = self.data.get(start..start + len) else {
            self.done = true;
            return Some(Err(()));
        };

        self.offset = start + len;
        Some(Ok(Record { id, version, payload }))
    }
}

fn records(image: &Image) -> Records<'_> {
    Records { data: &image[HEADER_SIZE..CRC_OFFSET], offset: 0, done: false }
}

/// Checks magic, format version, checksum and record framing.
pub fn check<E>(image: &Image) -> Result<(), StorageError<E>> {
    if image[0..2] != MAGIC {
        return Err(StorageError::Magic);
    }

    if image[2] != FORMAT_VERSION {
        return Err(StorageError::FormatVersion(image[2]));
    }

    let crc = X25.checksum(&image[..CRC_OFFSET]);
    if crc != u16::from_be_bytes([image[CRC_OFFSET], image[CRC_OFFSET + 1]]) {
        return Err(StorageError::Crc);
    }

    if records(image).any(|r| r.is_err()) {
        return Err(StorageError::Truncated);
    }

    Ok(())
}

/// Serializes every group of the registry into `image`.
pub fn encode<E>(settings: &Settings, image: &mut Image) -> Result<(), StorageError<E>> {
    image.fill(0);
    image[0..2].copy_from_slice(&MAGIC);
    image[2] = FORMAT_VERSION;

    let mut offset = HEADER_SIZE;
    for group in GROUPS.iter() {
        // leave room for this record's header and the end marker
        let payload_start = offset + RECORD_HEADER_SIZE;
        let payload_end = CRC_OFFSET.checked_sub(RECORD_HEADER_SIZE).ok_or(StorageError::Overflow)?;
        if payload_start > payload_end {
            return Err(StorageError::Overflow);
        }

        let len = group.encode(settings, &mut image[payload_start..payload_end]).map_err(|e| match e {
            postcard::Error::SerializeBufferFull => StorageError::Overflow,
            e => StorageError::Serialization(e),
        })?;

        image[offset..offset + 2].copy_from_slice(&(group.id as u16).to_be_bytes());
        image[offset + 2] = group.version;
        image[offset + 3..offset + 5].copy_from_slice(&(len as u16).to_be_bytes());
        offset = payload_start + len;
    }

    let crc = X25.checksum(&image[..CRC_OFFSET]);
    image[CRC_OFFSET..].copy_from_slice(&crc.to_be_bytes());
    Ok(())
}

/// Replaces `settings` with the contents of `image`. Groups that are missing, stored with another
/// version or fail to deserialize are reset to their defaults. On error, `settings` is untouched.
pub fn decode<E>(image: &Image, settings: &mut Settings, target: &Target) -> Result<(), StorageError<E>> {
    check(image)?;

    let mut loaded = [false; GROUP_COUNT];
    for record in records(image).flatten() {
        let Some(id) = GroupId::from_repr(record.id) else {
            debug!("Skipping unknown settings group {}.", record.id);
            continue;
        };

        let group = registry::group(id);
        if record.version != group.version {
            warn!(
                "Settings group {} stored with version {}, expected {}. Using defaults.",
                id, record.version, group.version
            );
            continue;
        }

        match group.decode(settings, record.payload) {
            Ok(()) => loaded[id as usize - 1] = true,
            Err(e) => warn!("Failed to decode settings group {}: {:?}. Using defaults.", id, e),
        }
    }

    for (group, _) in GROUPS.iter().zip(loaded).filter(|(_, loaded)| !loaded) {
        debug!("Settings group {} not loaded, resetting.", group.id);
        group.reset(settings, target);
    }

    Ok(())
}
