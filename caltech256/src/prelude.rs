pub use crate::caltech::{builder::Builder as Caltech256Builder, Caltech256};
pub use crate::download::{acquire, check_integrity, default_root, DatasetDescriptor, CALTECH256};
pub use crate::error::Error;
pub use crate::folder::ImageFolder;
pub use crate::loader::{default_loader, is_image_file, Loader, LoaderBackend, IMG_EXTENSIONS};
pub use crate::tensors::{image_to_tensor, one_hot, ImageTensor, TensorDataset};
