use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use super::{ConfigStorage, Image, IMAGE_SIZE};

/// Settings image stored in a file, e.g. a dump of the flight controller's settings sector.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStorage for FileStorage {
    type Error = Error;

    fn read_image(&mut self, image: &mut Image) -> Result<(), Self::Error> {
        let content = std::fs::read(&self.path)?;
        if content.len() != IMAGE_SIZE {
            let msg = format!("expected {} bytes, found {}", IMAGE_SIZE, content.len());
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }

        image.copy_from_slice(&content);
        Ok(())
    }

    fn write_image(&mut self, image: &Image) -> Result<(), Self::Error> {
        std::fs::write(&self.path, image)
    }
}
