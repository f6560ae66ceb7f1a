//! Persistence of the settings store.
//!
//! The store is written as a single fixed size image (see [`image`]) protected by a checksum.
//! Backends only provide reading and writing of raw images, everything else is implemented on top
//! of that by [`ConfigStorage`].

pub mod image;

#[cfg(not(target_os = "none"))]
mod file;

use core::convert::Infallible;
use core::fmt;

pub use image::{Image, IMAGE_SIZE};

#[cfg(not(target_os = "none"))]
pub use file::FileStorage;

use crate::settings::Settings;
use crate::target::Target;

#[derive(Debug)]
pub enum StorageError<E> {
    /// error of the underlying storage medium
    Backend(E),
    Serialization(postcard::Error),
    /// image does not start with the expected magic bytes, e.g. erased storage
    Magic,
    FormatVersion(u8),
    Crc,
    /// a record extends past the end of the image
    Truncated,
    /// the store does not fit into the image
    Overflow,
    /// written image could not be read back
    Verify,
}

impl<E> From<postcard::Error> for StorageError<E> {
    fn from(e: postcard::Error) -> Self {
        Self::Serialization(e)
    }
}

impl<E: fmt::Debug> fmt::Display for StorageError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "storage backend error: {:?}", e),
            Self::Serialization(e) => write!(f, "serialization error: {}", e),
            Self::Magic => write!(f, "no settings image found"),
            Self::FormatVersion(v) => write!(f, "unsupported image format version {}", v),
            Self::Crc => write!(f, "image checksum mismatch"),
            Self::Truncated => write!(f, "truncated settings record"),
            Self::Overflow => write!(f, "settings do not fit into image"),
            Self::Verify => write!(f, "read back of written image failed"),
        }
    }
}

#[cfg(not(target_os = "none"))]
impl<E: fmt::Debug> std::error::Error for StorageError<E> {}

/// Non-volatile storage for the settings image.
pub trait ConfigStorage {
    type Error: fmt::Debug;

    fn read_image(&mut self, image: &mut Image) -> Result<(), Self::Error>;

    fn write_image(&mut self, image: &Image) -> Result<(), Self::Error>;

    /// Loads the stored settings into `settings`. Stored groups replace the in-memory ones,
    /// missing or outdated groups are reset to the target's defaults. On error, `settings` is
    /// untouched.
    fn load(&mut self, settings: &mut Settings, target: &Target) -> Result<(), StorageError<Self::Error>> {
        let mut image = [0; IMAGE_SIZE];
        self.read_image(&mut image).map_err(StorageError::Backend)?;
        image::decode(&image, settings, target)
    }

    /// Writes `settings` and verifies the result by reading it back.
    fn write(&mut self, settings: &Settings) -> Result<(), StorageError<Self::Error>> {
        let mut image = [0; IMAGE_SIZE];
        image::encode(settings, &mut image)?;
        self.write_image(&image).map_err(StorageError::Backend)?;

        let mut read_back = [0; IMAGE_SIZE];
        self.read_image(&mut read_back).map_err(StorageError::Backend)?;
        if read_back != image {
            return Err(StorageError::Verify);
        }

        Ok(())
    }

    /// Whether the stored image has the expected format and an intact checksum.
    fn is_structure_valid(&mut self) -> bool {
        let mut image = [0; IMAGE_SIZE];
        self.read_image(&mut image).is_ok() && image::check::<Self::Error>(&image).is_ok()
    }
}

/// Settings image kept in RAM, starting out erased.
#[derive(Clone)]
pub struct MemoryStorage {
    image: Image,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { image: [0xff; IMAGE_SIZE] }
    }

    pub fn from_image(image: Image) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStorage for MemoryStorage {
    type Error = Infallible;

    fn read_image(&mut self, image: &mut Image) -> Result<(), Self::Error> {
        image.copy_from_slice(&self.image);
        Ok(())
    }

    fn write_image(&mut self, image: &Image) -> Result<(), Self::Error> {
        self.image.copy_from_slice(image);
        Ok(())
    }
}
