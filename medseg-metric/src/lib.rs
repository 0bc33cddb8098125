//! Evaluation metrics for binary segmentation training with Burn.
//!
//! This crate wraps the overlap scores from `medseg-loss` into the metric
//! machinery the training loop consumes, plus the quantized IoU score used
//! for boolean mask evaluation:
//!
//! - [`DiceMetric`]: epoch-level batch-averaged Dice coefficient
//! - [`ThresholdedIoUMetric`] / [`iou_thresholded_batch`]: step-quantized
//!   IoU over batches of binarized masks, rewarding only above-0.5 overlap
//!
//! All metrics follow Burn's metric patterns: generic over `Backend`,
//! implementing `Metric` and `Numeric` with `NumericMetricState`, taking
//! their prediction/target batches through the input structs in
//! [`input`].
//!
//! ```rust,ignore
//! use burn::train::metric::{Metric, MetricMetadata, Numeric};
//! use medseg_metric::{DiceInput, DiceMetric};
//!
//! # fn example<B: burn::tensor::backend::Backend>(
//! #     predictions: burn::tensor::Tensor<B, 4>,
//! #     targets: burn::tensor::Tensor<B, 4>,
//! # ) {
//! let mut dice = DiceMetric::<B>::new();
//! let input = DiceInput::new(predictions, targets);
//! dice.update(&input, &MetricMetadata::fake());
//! println!("Dice: {}", dice.value());
//! # }
//! ```

pub mod dice;
pub mod input;
pub mod thresholded_iou;

pub use dice::DiceMetric;
pub use input::{DiceInput, ThresholdedIoUInput};
pub use thresholded_iou::{iou_thresholded_batch, threshold_quantize, ThresholdedIoUMetric, SMOOTH};
