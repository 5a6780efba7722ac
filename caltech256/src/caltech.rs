use std::path::{Path, PathBuf};

use dfdx::data::ExactSizeDataset;
use image::RgbImage;

use crate::{
    download::{self, check_integrity, DatasetDescriptor, CALTECH256},
    error::Error,
    folder::ImageFolder,
    loader::{Loader, LoaderBackend, IMG_EXTENSIONS},
};

/// The Caltech-256 object category dataset, verified and ready to index.
///
/// ```no_run
/// use caltech256::Caltech256;
///
/// let dataset = Caltech256::builder("data").download(true).build()?;
/// let (image, label) = dataset.get(0)?;
/// println!("{} {}x{}", dataset.classes()[label], image.width(), image.height());
/// # Ok::<(), caltech256::Error>(())
/// ```
#[derive(Debug)]
pub struct Caltech256 {
    root: PathBuf,
    train: bool,
    folder: ImageFolder,
}

impl Caltech256 {
    pub const DESCRIPTOR: DatasetDescriptor = CALTECH256;

    pub fn builder(root: impl AsRef<Path>) -> builder::Builder {
        builder::Builder::new(root.as_ref().to_owned())
    }

    pub fn new(root: impl AsRef<Path>, download: bool) -> Result<Self, Error> {
        Self::builder(root).download(download).build()
    }

    /// Fetches and unpacks the archive into `root`, returning the category folder.
    pub fn download(root: impl AsRef<Path>) -> Result<PathBuf, Error> {
        download::acquire(&Self::DESCRIPTOR, root.as_ref())
    }

    /// Directory holding the archive.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per category.
    pub fn base_folder(&self) -> &Path {
        self.folder.root()
    }

    /// The flag given at construction. Caltech-256 ships without a split, so
    /// it does not select samples.
    pub fn train(&self) -> bool {
        self.train
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        &IMG_EXTENSIONS
    }

    pub fn classes(&self) -> &[String] {
        self.folder.classes()
    }

    pub fn class_to_idx(&self, class: &str) -> Option<usize> {
        self.folder.class_to_idx(class)
    }

    pub fn samples(&self) -> &[(PathBuf, usize)] {
        self.folder.samples()
    }

    pub fn folder(&self) -> &ImageFolder {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.folder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folder.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<(RgbImage, usize), Error> {
        self.folder.get(index)
    }
}

impl ExactSizeDataset for Caltech256 {
    type Item<'a> = Result<(RgbImage, usize), Error>
    where
        Self: 'a;

    fn get(&self, index: usize) -> Self::Item<'_> {
        self.folder.get(index)
    }

    fn len(&self) -> usize {
        self.folder.len()
    }
}

pub mod builder {
    use super::*;
    use crate::{
        folder::{ImageTransform, TargetTransform},
        loader::is_image_file,
    };

    pub struct Builder {
        root: PathBuf,
        descriptor: DatasetDescriptor,
        train: bool,
        download: bool,
        backend: LoaderBackend,
        transform: Option<Box<ImageTransform>>,
        target_transform: Option<Box<TargetTransform>>,
    }

    impl Builder {
        pub(super) fn new(root: PathBuf) -> Self {
            Self {
                root,
                descriptor: Caltech256::DESCRIPTOR,
                train: true,
                download: false,
                backend: LoaderBackend::default(),
                transform: None,
                target_transform: None,
            }
        }

        #[cfg(test)]
        pub(crate) fn with_descriptor(mut self, descriptor: DatasetDescriptor) -> Self {
            self.descriptor = descriptor;
            self
        }

        pub fn train(mut self, train: bool) -> Self {
            self.train = train;
            self
        }

        /// Fetch and extract the archive before verifying it.
        pub fn download(mut self, download: bool) -> Self {
            self.download = download;
            self
        }

        pub fn backend(mut self, backend: LoaderBackend) -> Self {
            self.backend = backend;
            self
        }

        /// Applied to every decoded image on access.
        pub fn transform(
            mut self,
            transform: impl Fn(RgbImage) -> RgbImage + Send + Sync + 'static,
        ) -> Self {
            self.transform = Some(Box::new(transform));
            self
        }

        /// Applied to every label on access.
        pub fn target_transform(
            mut self,
            target_transform: impl Fn(usize) -> usize + Send + Sync + 'static,
        ) -> Self {
            self.target_transform = Some(Box::new(target_transform));
            self
        }

        pub fn build(self) -> Result<Caltech256, Error> {
            if self.download {
                download::acquire(&self.descriptor, &self.root)?;
            }

            let archive = self.descriptor.archive_path(&self.root);
            if !check_integrity(&archive, self.descriptor.md5) {
                return Err(Error::Integrity { archive });
            }

            let mut folder = ImageFolder::new(
                self.descriptor.base_path(&self.root),
                Loader::new(self.backend),
                is_image_file,
            )?;
            folder.set_transforms(self.transform, self.target_transform);

            Ok(Caltech256 {
                root: self.root,
                train: self.train,
                folder,
            })
        }
    }
}
