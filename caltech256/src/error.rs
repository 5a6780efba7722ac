use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("homedir error: {0}")]
    Home(#[from] homedir::GetHomeError),

    #[error("home directory could not be determined")]
    NoHomeDir,

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error(
        "Dataset not found or corrupted at '{}'. You can use download=true to download it",
        .archive.display()
    )]
    Integrity { archive: PathBuf },

    #[error("failed to download '{url}': {source}")]
    Download {
        url: String,
        #[source]
        source: Box<Error>,
    },

    #[error("checksum mismatch for '{}': expected {expected}, found {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to extract archive '{}': {source}", .archive.display())]
    Extract {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset folder '{}' does not exist", .0.display())]
    MissingBaseFolder(PathBuf),

    #[error("found no valid images in subfolders of '{}'", .0.display())]
    EmptyFolder(PathBuf),

    #[error("sample index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("error while decoding image '{0}': {1}")]
    DecodeImage(PathBuf, image::ImageError),
}
