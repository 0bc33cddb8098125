//! Input structures for the segmentation metrics.
//!
//! Each metric consumes a small struct pairing the prediction batch with the
//! ground-truth batch, so the training loop can build them once per step.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Bool},
};
use derive_new::new;

/// Dice metric input.
#[derive(new, Debug, Clone)]
pub struct DiceInput<B: Backend> {
    /// Predicted probability masks, `[batch, 1, height, width]`.
    pub predictions: Tensor<B, 4>,
    /// Binary ground-truth masks, `[batch, 1, height, width]`.
    pub targets: Tensor<B, 4>,
}

/// Thresholded IoU metric input.
#[derive(new, Debug, Clone)]
pub struct ThresholdedIoUInput<B: Backend> {
    /// Binarized predicted masks, `[batch, 1, height, width]`.
    pub predictions: Tensor<B, 4, Bool>,
    /// Binary ground-truth masks, `[batch, height, width]`.
    pub targets: Tensor<B, 3, Bool>,
}
