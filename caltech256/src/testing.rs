//! Fixture helpers shared by the unit tests.

use std::{io::Cursor, path::Path};

use image::{ImageOutputFormat, Rgb, RgbImage};

use crate::download::DatasetDescriptor;

pub(crate) fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, data).unwrap();
}

pub(crate) fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

pub(crate) fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(90))
        .unwrap();
    bytes
}

pub(crate) fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

pub(crate) fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Descriptor shaped like the Caltech-256 one whose checksum matches `archive`.
pub(crate) fn descriptor_for(archive: &[u8]) -> DatasetDescriptor {
    DatasetDescriptor {
        base_folder: "256_ObjectCategories",
        url: "http://127.0.0.1:9/256_ObjectCategories.tar",
        filename: "256_ObjectCategories.tar",
        md5: Box::leak(md5_hex(archive).into_boxed_str()),
    }
}

const AK47: &str = "256_ObjectCategories/001.ak47";
const FLAG: &str = "256_ObjectCategories/002.american-flag";

/// Writes a verified archive plus its extracted tree under `root`.
pub(crate) fn seeded_root(root: &Path) -> DatasetDescriptor {
    let jpeg = jpeg_bytes(6, 4, [0, 128, 0]);
    let files = [
        (format!("{AK47}/001_0001.jpg"), jpeg.clone()),
        (format!("{AK47}/001_0002.jpg"), jpeg.clone()),
        (format!("{AK47}/001_0003.JPEG"), jpeg.clone()),
        (format!("{AK47}/001_0004.jpg"), Vec::new()),
        (format!("{AK47}/Thumbs.db"), b"junk".to_vec()),
        (format!("{FLAG}/002_0001.jpg"), jpeg.clone()),
        (format!("{FLAG}/002_0002.png"), jpeg),
    ];
    let entries: Vec<(&str, &[u8])> = files
        .iter()
        .map(|(path, data)| (path.as_str(), data.as_slice()))
        .collect();
    let archive = tar_bytes(&entries);
    let descriptor = descriptor_for(&archive);

    write_file(&descriptor.archive_path(root), &archive);
    for (path, data) in &files {
        write_file(&root.join(path), data);
    }
    descriptor
}
