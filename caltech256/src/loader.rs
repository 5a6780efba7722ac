use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use image::{io::Reader as ImageReader, RgbImage};

use crate::error::Error;

/// File suffixes recognized as images, compared case-insensitively.
pub const IMG_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".png", ".ppm", ".bmp", ".pgm", ".tif"];

pub fn has_file_allowed_extension(path: &Path, extensions: &[&str]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| name.ends_with(ext))
}

/// Recognized image extension and a non-empty file. Zero-byte files are left
/// out of the dataset instead of failing at decode time.
pub fn is_image_file(path: &Path) -> bool {
    has_file_allowed_extension(path, &IMG_EXTENSIONS)
        && std::fs::metadata(path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
}

/// How image files are read before decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderBackend {
    /// Buffered file reader, format guessed from the content.
    #[default]
    Buffered,
    /// Whole file read into memory with one call and decoded from the
    /// buffer. Falls back to `Buffered` when reading or decoding fails.
    InMemory,
}

impl fmt::Display for LoaderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered => f.write_str("buffered"),
            Self::InMemory => f.write_str("in-memory"),
        }
    }
}

impl FromStr for LoaderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buffered" => Ok(Self::Buffered),
            "in-memory" | "memory" => Ok(Self::InMemory),
            other => Err(format!("unknown loader backend '{other}'")),
        }
    }
}

/// Turns an image path into a decoded RGB image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    backend: LoaderBackend,
}

impl Loader {
    pub fn new(backend: LoaderBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> LoaderBackend {
        self.backend
    }

    pub fn load(&self, path: &Path) -> Result<RgbImage, Error> {
        match self.backend {
            LoaderBackend::Buffered => buffered_loader(path),
            LoaderBackend::InMemory => in_memory_loader(path).or_else(|err| {
                log::debug!(
                    "In-memory decode of {} failed ({err}), retrying buffered",
                    path.display()
                );
                buffered_loader(path)
            }),
        }
    }
}

/// Decodes `path` with the baseline backend.
pub fn default_loader(path: &Path) -> Result<RgbImage, Error> {
    Loader::default().load(path)
}

fn buffered_loader(path: &Path) -> Result<RgbImage, Error> {
    let reader = ImageReader::new(BufReader::new(File::open(path)?)).with_guessed_format()?;
    let image = reader
        .decode()
        .map_err(|err| Error::DecodeImage(path.to_owned(), err))?;
    Ok(image.into_rgb8())
}

fn in_memory_loader(path: &Path) -> Result<RgbImage, Error> {
    let bytes = std::fs::read(path)?;
    let image =
        image::load_from_memory(&bytes).map_err(|err| Error::DecodeImage(path.to_owned(), err))?;
    Ok(image.into_rgb8())
}
