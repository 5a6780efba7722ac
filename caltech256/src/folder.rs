use std::{
    fmt,
    path::{Path, PathBuf},
};

use image::RgbImage;
use walkdir::WalkDir;

use crate::{error::Error, loader::Loader};

pub type ImageTransform = dyn Fn(RgbImage) -> RgbImage + Send + Sync;
pub type TargetTransform = dyn Fn(usize) -> usize + Send + Sync;

/// Images laid out as `root/<class>/**/<file>`, labelled by the position of
/// `<class>` among the alphabetically sorted class directories.
pub struct ImageFolder {
    root: PathBuf,
    classes: Vec<String>,
    samples: Vec<(PathBuf, usize)>,
    loader: Loader,
    transform: Option<Box<ImageTransform>>,
    target_transform: Option<Box<TargetTransform>>,
}

impl ImageFolder {
    pub fn new(
        root: impl Into<PathBuf>,
        loader: Loader,
        is_valid_file: impl Fn(&Path) -> bool,
    ) -> Result<Self, Error> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::MissingBaseFolder(root));
        }

        let classes = find_classes(&root)?;
        let mut samples = Vec::new();
        for (class_idx, class) in classes.iter().enumerate() {
            // Files of a directory come before its subdirectories.
            let walker = WalkDir::new(root.join(class))
                .follow_links(true)
                .sort_by(|a, b| {
                    a.file_type()
                        .is_dir()
                        .cmp(&b.file_type().is_dir())
                        .then_with(|| a.file_name().cmp(b.file_name()))
                });
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() && is_valid_file(entry.path()) {
                    samples.push((entry.into_path(), class_idx));
                }
            }
        }
        if samples.is_empty() {
            return Err(Error::EmptyFolder(root));
        }

        log::info!(
            "Found {} images in {} classes under {}",
            samples.len(),
            classes.len(),
            root.display()
        );
        Ok(Self {
            root,
            classes,
            samples,
            loader,
            transform: None,
            target_transform: None,
        })
    }

    pub fn with_transform(
        mut self,
        transform: impl Fn(RgbImage) -> RgbImage + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn with_target_transform(
        mut self,
        target_transform: impl Fn(usize) -> usize + Send + Sync + 'static,
    ) -> Self {
        self.target_transform = Some(Box::new(target_transform));
        self
    }

    pub(crate) fn set_transforms(
        &mut self,
        transform: Option<Box<ImageTransform>>,
        target_transform: Option<Box<TargetTransform>>,
    ) {
        self.transform = transform;
        self.target_transform = target_transform;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Class directory names; a label is an index into this slice.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_to_idx(&self, class: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|name| name.as_str().cmp(class))
            .ok()
    }

    pub fn samples(&self) -> &[(PathBuf, usize)] {
        &self.samples
    }

    pub fn loader(&self) -> Loader {
        self.loader
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Decodes sample `index` and applies the transforms. Nothing is cached.
    pub fn get(&self, index: usize) -> Result<(RgbImage, usize), Error> {
        let (path, target) = self.samples.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.samples.len(),
        })?;

        let mut image = self.loader.load(path)?;
        if let Some(transform) = &self.transform {
            image = transform(image);
        }
        let target = match &self.target_transform {
            Some(target_transform) => target_transform(*target),
            None => *target,
        };
        Ok((image, target))
    }
}

impl fmt::Debug for ImageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFolder")
            .field("root", &self.root)
            .field("classes", &self.classes.len())
            .field("samples", &self.samples.len())
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

fn find_classes(root: &Path) -> Result<Vec<String>, Error> {
    let mut classes = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.path().is_dir() {
            classes.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    if classes.is_empty() {
        return Err(Error::EmptyFolder(root.to_owned()));
    }
    classes.sort();
    Ok(classes)
}
