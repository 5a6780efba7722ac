use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::Error;

/// Identity of a downloadable dataset archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescriptor {
    /// Folder the archive unpacks into, relative to the dataset root.
    pub base_folder: &'static str,
    pub url: &'static str,
    pub filename: &'static str,
    /// Hex encoded MD5 digest of the archive.
    pub md5: &'static str,
}

pub const CALTECH256: DatasetDescriptor = DatasetDescriptor {
    base_folder: "256_ObjectCategories",
    url: "http://www.vision.caltech.edu/Image_Datasets/Caltech256/256_ObjectCategories.tar",
    filename: "256_ObjectCategories.tar",
    md5: "67b4f42ca05d46448c6bb8ecd2220f6d",
};

impl DatasetDescriptor {
    pub fn archive_path(&self, root: &Path) -> PathBuf {
        root.join(self.filename)
    }

    pub fn base_path(&self, root: &Path) -> PathBuf {
        root.join(self.base_folder)
    }
}

const CHUNK_SIZE: usize = 262144; // 256KiB buffer

fn ensure_dir(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Data directory used when no root is given: `~/.caltech256/data`.
pub fn default_root() -> Result<PathBuf, Error> {
    let home = homedir::get_my_home()?
        .ok_or(Error::NoHomeDir)?
        .join(".caltech256");
    Ok(home.join("data"))
}

/// Hex encoded MD5 digest of the file at `path`.
pub fn file_md5(path: &Path) -> Result<String, Error> {
    let mut file = File::open(path)?;
    let mut context = md5::Context::new();
    let mut buf = vec![0; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        context.consume(&buf[..read]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// Returns true if `path` is a readable file whose MD5 digest equals `md5`.
pub fn check_integrity(path: &Path, md5: &str) -> bool {
    if !path.is_file() {
        return false;
    }
    match file_md5(path) {
        Ok(actual) => actual.eq_ignore_ascii_case(md5),
        Err(err) => {
            log::warn!("Could not checksum {}: {err}", path.display());
            false
        }
    }
}

/// Downloads `url` to `root/filename` unless a file with the expected
/// checksum is already there. The downloaded file is verified against `md5`.
pub fn download_url(url: &str, root: &Path, filename: &str, md5: &str) -> Result<PathBuf, Error> {
    ensure_dir(root)?;
    let downloaded_file = root.join(filename);

    if check_integrity(&downloaded_file, md5) {
        log::info!(
            "Using downloaded and verified file: {}",
            downloaded_file.display()
        );
        return Ok(downloaded_file);
    }

    log::info!("Downloading {} to: {}", url, downloaded_file.display());
    fetch(url, &downloaded_file).map_err(|source| Error::Download {
        url: url.to_owned(),
        source: Box::new(source),
    })?;

    let actual = file_md5(&downloaded_file)?;
    if !actual.eq_ignore_ascii_case(md5) {
        return Err(Error::ChecksumMismatch {
            path: downloaded_file,
            expected: md5.to_owned(),
            actual,
        });
    }
    Ok(downloaded_file)
}

fn fetch(url: &str, dest: &Path) -> Result<(), Error> {
    // The archive is large; the blocking client's default timeout would cut it off.
    let client = reqwest::blocking::Client::builder()
        .timeout(None::<std::time::Duration>)
        .build()?;
    let mut response = client.get(url).send()?.error_for_status()?;

    let mut file = File::create(dest)?;
    let pb = indicatif::ProgressBar::new(response.content_length().unwrap_or(0));
    let mut buf = vec![0; CHUNK_SIZE];
    loop {
        let read = response.read(&mut buf)?;
        if read == 0 {
            break;
        }
        file.write_all(&buf[..read])?;
        pb.inc(read as u64);
    }
    pb.finish_and_clear();
    file.flush()?;
    Ok(())
}

fn is_gzipped(archive_file: &Path) -> bool {
    let name = archive_file
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".tgz") || name.ends_with(".tar.gz")
}

/// Unpacks every entry of `archive_file` into `dest_dir`.
///
/// Entries are written relative to `dest_dir`; the process working directory
/// is left untouched.
pub fn extract_archive(archive_file: &Path, dest_dir: &Path) -> Result<(), Error> {
    log::info!(
        "Extracting archive {} to: {}",
        archive_file.display(),
        dest_dir.display()
    );

    let unpack = || -> io::Result<()> {
        let file = BufReader::new(File::open(archive_file)?);
        if is_gzipped(archive_file) {
            Archive::new(GzDecoder::new(file)).unpack(dest_dir)
        } else {
            Archive::new(file).unpack(dest_dir)
        }
    };
    unpack().map_err(|source| Error::Extract {
        archive: archive_file.to_owned(),
        source,
    })
}

/// Fetches and unpacks the archive described by `descriptor` into `root`,
/// returning the extracted base folder.
pub fn acquire(descriptor: &DatasetDescriptor, root: &Path) -> Result<PathBuf, Error> {
    let archive_file = download_url(
        descriptor.url,
        root,
        descriptor.filename,
        descriptor.md5,
    )?;
    extract_archive(&archive_file, root)?;
    Ok(descriptor.base_path(root))
}
