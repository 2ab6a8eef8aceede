use std::path::Path;

use crate::error::TrainError;

/// An immutable, ordered collection of (flattened image, class label) pairs.
///
/// Images arrive preprocessed: every sample is a flat `Vec<f64>` of pixels
/// normalized to [0, 1], all of equal length. Labels are class indices in
/// `[0, num_classes)`. The dataset is loaded once at run start and never
/// mutated afterwards.
pub struct Dataset {
    images: Vec<Vec<f64>>,
    labels: Vec<usize>,
    num_classes: usize,
}

impl Dataset {
    /// Builds a dataset from already-decoded parts, validating shape and
    /// label-range invariants.
    pub fn from_parts(
        images: Vec<Vec<f64>>,
        labels: Vec<usize>,
        num_classes: usize,
    ) -> Result<Dataset, TrainError> {
        if images.len() != labels.len() {
            return Err(TrainError::Dataset(format!(
                "{} images but {} labels",
                images.len(),
                labels.len()
            )));
        }
        if num_classes < 2 {
            return Err(TrainError::Dataset(format!(
                "num_classes must be at least 2, got {num_classes}"
            )));
        }
        if let Some(first) = images.first() {
            let width = first.len();
            if images.iter().any(|img| img.len() != width) {
                return Err(TrainError::Dataset(
                    "images have inconsistent lengths".into(),
                ));
            }
        }
        if let Some((i, &label)) = labels
            .iter()
            .enumerate()
            .find(|(_, &label)| label >= num_classes)
        {
            return Err(TrainError::Dataset(format!(
                "label {label} at index {i} is out of range for num_classes={num_classes}"
            )));
        }
        Ok(Dataset { images, labels, num_classes })
    }

    /// Loads a preprocessed dataset stored as an IDX image/label file pair
    /// (the MNIST container format: big-endian headers, uint8 payload).
    /// Pixels are divided by 255 so values lie in [0, 1].
    pub fn load_idx_pair(
        image_path: &Path,
        label_path: &Path,
        num_classes: usize,
    ) -> Result<Dataset, TrainError> {
        let image_bytes = std::fs::read(image_path)?;
        let label_bytes = std::fs::read(label_path)?;
        Dataset::parse_idx_pair(&image_bytes, &label_bytes, num_classes)
    }

    fn parse_idx_pair(
        image_bytes: &[u8],
        label_bytes: &[u8],
        num_classes: usize,
    ) -> Result<Dataset, TrainError> {
        let (n_items, n_pixels) = parse_idx3_header(image_bytes)?;
        let label_count = parse_idx1_header(label_bytes)?;

        if label_count != n_items {
            return Err(TrainError::Dataset(format!(
                "image file declares {n_items} items but label file declares {label_count}"
            )));
        }

        let data_len = n_items
            .checked_mul(n_pixels)
            .ok_or_else(|| TrainError::Dataset("image payload size overflows usize".into()))?;
        if image_bytes.len() < 16 + data_len {
            return Err(TrainError::Dataset(format!(
                "image file too short: {n_items} items of {n_pixels} pixels need {} bytes, got {}",
                16 + data_len,
                image_bytes.len()
            )));
        }
        if label_bytes.len() < 8 + n_items {
            return Err(TrainError::Dataset(format!(
                "label file too short: {n_items} labels need {} bytes, got {}",
                8 + n_items,
                label_bytes.len()
            )));
        }

        let images: Vec<Vec<f64>> = image_bytes[16..16 + data_len]
            .chunks_exact(n_pixels)
            .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
            .collect();
        let labels: Vec<usize> = label_bytes[8..8 + n_items]
            .iter()
            .map(|&b| b as usize)
            .collect();

        Dataset::from_parts(images, labels, num_classes)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Pixel dimension of each sample; 0 for an empty dataset.
    pub fn sample_size(&self) -> usize {
        self.images.first().map_or(0, Vec::len)
    }

    pub fn image(&self, index: usize) -> &[f64] {
        &self.images[index]
    }

    pub fn label(&self, index: usize) -> usize {
        self.labels[index]
    }
}

/// Validates an IDX3 image header and returns (n_items, pixels_per_item).
fn parse_idx3_header(bytes: &[u8]) -> Result<(usize, usize), TrainError> {
    if bytes.len() < 16 {
        return Err(TrainError::Dataset(format!(
            "IDX image file too short: expected at least 16 header bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 || bytes[2] != 0x08 || bytes[3] != 0x03 {
        return Err(TrainError::Dataset(format!(
            "not an IDX3 uint8 image file (magic {:02X} {:02X} {:02X} {:02X})",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )));
    }
    let n_items = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let rows = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let cols = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    let n_pixels = rows
        .checked_mul(cols)
        .ok_or_else(|| TrainError::Dataset("rows * cols overflows usize".into()))?;
    Ok((n_items, n_pixels))
}

/// Validates an IDX1 label header and returns the declared label count.
fn parse_idx1_header(bytes: &[u8]) -> Result<usize, TrainError> {
    if bytes.len() < 8 {
        return Err(TrainError::Dataset(format!(
            "IDX label file too short: expected at least 8 header bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 || bytes[2] != 0x08 || bytes[3] != 0x01 {
        return Err(TrainError::Dataset(format!(
            "not an IDX1 uint8 label file (magic {:02X} {:02X} {:02X} {:02X})",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )));
    }
    Ok(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize)
}
