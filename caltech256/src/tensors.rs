use dfdx::{
    data::ExactSizeDataset,
    shapes::{Const, Rank1, Rank3},
    tensor::{AutoDevice, Tensor, TensorFromVec},
};
use image::{
    imageops::{self, FilterType},
    RgbImage,
};

use crate::{caltech::Caltech256, error::Error};

/// Side length images are resized to before becoming tensors.
pub const IMAGE_SIZE: usize = 224;

pub type ImageTensor = Tensor<Rank3<3, IMAGE_SIZE, IMAGE_SIZE>, f32, AutoDevice>;

/// Resizes to 224x224 and lays the pixels out channel-major, scaled to [0, 1].
pub fn image_to_tensor(dev: &AutoDevice, image: &RgbImage) -> ImageTensor {
    let size = IMAGE_SIZE as u32;
    let image = imageops::resize(image, size, size, FilterType::Triangle);

    let mut data = Vec::with_capacity(3 * IMAGE_SIZE * IMAGE_SIZE);
    for channel in 0..3 {
        data.extend(image.pixels().map(|p| p.0[channel] as f32 / 255.0));
    }
    dev.tensor_from_vec(data, (Const::<3>, Const::<IMAGE_SIZE>, Const::<IMAGE_SIZE>))
}

pub fn one_hot<const N: usize>(
    label: usize,
    dev: &AutoDevice,
) -> Result<Tensor<Rank1<N>, f32, AutoDevice>, Error> {
    if label >= N {
        return Err(Error::IndexOutOfRange {
            index: label,
            len: N,
        });
    }
    let mut data = vec![0.0; N];
    data[label] = 1.0;
    Ok(dev.tensor_from_vec(data, (Const::<N>,)))
}

/// Tensor view of a [`Caltech256`] for a dfdx training loop.
pub struct TensorDataset<'a> {
    dataset: &'a Caltech256,
    dev: AutoDevice,
}

impl<'a> TensorDataset<'a> {
    pub fn new(dataset: &'a Caltech256, dev: AutoDevice) -> Self {
        Self { dataset, dev }
    }
}

impl Caltech256 {
    pub fn tensors(&self, dev: AutoDevice) -> TensorDataset<'_> {
        TensorDataset::new(self, dev)
    }
}

impl ExactSizeDataset for TensorDataset<'_> {
    type Item<'b> = Result<(ImageTensor, usize), Error>
    where
        Self: 'b;

    fn get(&self, index: usize) -> Self::Item<'_> {
        let (image, label) = self.dataset.get(index)?;
        Ok((image_to_tensor(&self.dev, &image), label))
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::seeded_root;

    #[test]
    fn image_tensor_is_channel_major() {
        let dev = AutoDevice::default();
        let image = RgbImage::from_pixel(10, 7, Rgb([255, 0, 51]));

        let values = image_to_tensor(&dev, &image).as_vec();
        let plane = IMAGE_SIZE * IMAGE_SIZE;
        assert_eq!(values.len(), 3 * plane);
        assert!(values[..plane].iter().all(|v| *v > 0.99));
        assert!(values[plane..2 * plane].iter().all(|v| *v < 0.01));
        assert!(values[2 * plane..]
            .iter()
            .all(|v| (*v - 0.2).abs() < 0.01));
    }

    #[test]
    fn one_hot_marks_label() {
        let dev = AutoDevice::default();
        let t = one_hot::<4>(2, &dev).unwrap();
        assert_eq!(t.as_vec(), [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn one_hot_rejects_large_label() {
        let dev = AutoDevice::default();
        let err = one_hot::<257>(257, &dev).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 257, len: 257 }));
    }

    #[test]
    fn tensor_view_over_dataset() {
        let dir = TempDir::new().unwrap();
        let descriptor = seeded_root(dir.path());
        let dataset = Caltech256::builder(dir.path())
            .with_descriptor(descriptor)
            .build()
            .unwrap();

        let tensors = dataset.tensors(AutoDevice::default());
        assert_eq!(tensors.len(), 5);

        let (tensor, label) = tensors.get(3).unwrap();
        assert_eq!(label, 1);
        assert_eq!(tensor.as_vec().len(), 3 * IMAGE_SIZE * IMAGE_SIZE);
        assert!(matches!(
            tensors.get(5),
            Err(Error::IndexOutOfRange { index: 5, len: 5 })
        ));
    }
}
