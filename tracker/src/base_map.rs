use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

const PNG_MAGIC: &[u8] = b"\x89PNG";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Encoded equirectangular world image, decoded by the drawing surface
#[derive(Clone, Debug, PartialEq)]
pub struct BaseMap {
    /// Unique key for texture caching
    pub name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

pub trait BaseMapProvider {
    fn base_map(&self) -> Option<Arc<BaseMap>>;
}

/// Reads the image from disk, once per call
#[derive(Clone, Debug)]
pub struct FileBaseMap {
    path: PathBuf,
}

impl FileBaseMap {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl BaseMapProvider for FileBaseMap {
    fn base_map(&self) -> Option<Arc<BaseMap>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %self.path.display(), err = %e, "Failed to read base map");
                return None;
            }
        };
        let Some(format) = ImageFormat::sniff(&bytes) else {
            warn!(path = %self.path.display(), "Base map is neither PNG nor JPEG");
            return None;
        };
        info!(path = %self.path.display(), ?format, size = bytes.len(), "Loaded base map");
        Some(Arc::new(BaseMap {
            name: self.path.display().to_string(),
            format,
            bytes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_formats() {
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n...."),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn missing_file_gives_no_map() {
        let provider = FileBaseMap::new("/definitely/not/here/earth.jpg");
        assert!(provider.base_map().is_none());
    }

    #[test]
    fn loads_png_from_disk() {
        let path = std::env::temp_dir().join(format!("tracker-base-map-{}.png", std::process::id()));
        fs::write(&path, b"\x89PNG\r\n\x1a\nrest").unwrap();
        let map = FileBaseMap::new(&path).base_map().unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(map.format, ImageFormat::Png);
        assert_eq!(map.bytes.len(), 12);
    }
}
