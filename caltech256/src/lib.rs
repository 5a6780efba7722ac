pub mod caltech;
pub mod download;
pub mod error;
pub mod folder;
pub mod loader;
pub mod prelude;
pub mod tensors;

#[cfg(test)]
mod testing;

pub use self::{
    caltech::Caltech256,
    download::{DatasetDescriptor, CALTECH256},
    error::Error,
    loader::{Loader, LoaderBackend},
};
