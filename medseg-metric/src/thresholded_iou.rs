//! Thresholded boolean IoU metric.
//!
//! Scores batches of binarized segmentation masks with a step-quantized IoU
//! in the style of competition scoring rubrics: per-example IoU below 0.5
//! scores zero, and each further 0.05 of IoU earns one 0.1 step up to 1.0.
//! The metric operates on already-thresholded masks and is not used for
//! gradient computation.

use core::marker::PhantomData;

use burn::{
    prelude::*,
    tensor::{backend::Backend, Bool, Tensor},
    train::metric::{
        state::{FormatOptions, NumericMetricState},
        Metric, MetricEntry, MetricMetadata, Numeric,
    },
};

use crate::input::ThresholdedIoUInput;

/// Smoothing term keeping empty-mask pairs away from 0/0.
pub const SMOOTH: f64 = 1e-6;

/// Quantize a raw IoU value into the competition score buckets.
///
/// `iou <= 0.5` maps to 0.0, `iou >= 1.0` maps to 1.0, and values in
/// between climb in steps of 0.1 per 0.05 of IoU:
///
/// ```text
/// thresholded = ceil(clamp(20 * (iou - 0.5), 0, 10)) / 10
/// ```
pub fn threshold_quantize(iou: f64) -> f64 {
    (20.0 * (iou - 0.5)).clamp(0.0, 10.0).ceil() / 10.0
}

/// Compute the per-example thresholded IoU scores for a batch of masks.
///
/// The singleton channel axis of `outputs` is removed before scoring;
/// intersection and union are pixel counts over the spatial axes.
/// Aggregation across the batch is left to the caller.
///
/// # Shapes
///
/// - outputs: `[batch, 1, height, width]` boolean masks
/// - labels: `[batch, height, width]` boolean masks
/// - returns: one score per batch element
pub fn iou_thresholded_batch<B: Backend>(
    outputs: Tensor<B, 4, Bool>,
    labels: Tensor<B, 3, Bool>,
) -> Vec<f64> {
    let output_dims = outputs.dims();
    let label_dims = labels.dims();
    assert!(
        output_dims[0] > 0,
        "Batch for thresholded IoU must contain at least one example"
    );
    assert_eq!(
        output_dims[1], 1,
        "Predicted masks must have a singleton channel axis, got {output_dims:?}"
    );
    assert_eq!(
        [output_dims[0], output_dims[2], output_dims[3]],
        label_dims,
        "Shape of predicted masks ({output_dims:?}) must match labels ({label_dims:?})"
    );

    let batch_size = output_dims[0];
    let outputs = outputs.squeeze::<3>(1);

    let intersection = outputs
        .clone()
        .bool_and(labels.clone())
        .int()
        .reshape([batch_size as i32, -1])
        .sum_dim(1)
        .float();
    let union = outputs
        .bool_or(labels)
        .int()
        .reshape([batch_size as i32, -1])
        .sum_dim(1)
        .float();

    intersection
        .into_data()
        .iter::<f64>()
        .zip(union.into_data().iter::<f64>())
        .map(|(inter, uni)| threshold_quantize((inter + SMOOTH) / (uni + SMOOTH)))
        .collect()
}

// --- Thresholded IoU Metric ---

/// Epoch-level thresholded IoU metric.
///
/// Averages the per-example scores of [`iou_thresholded_batch`] across every
/// update via [`NumericMetricState`].
#[derive(Default)]
pub struct ThresholdedIoUMetric<B: Backend> {
    state: NumericMetricState,
    _b: PhantomData<B>,
}

impl<B: Backend> ThresholdedIoUMetric<B> {
    /// Creates a new thresholded IoU metric.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: Backend> Metric for ThresholdedIoUMetric<B> {
    type Input = ThresholdedIoUInput<B>;

    fn name(&self) -> String {
        "Thresholded IoU".to_owned()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let scores = iou_thresholded_batch(item.predictions.clone(), item.targets.clone());
        let batch_size = scores.len();
        let mean = scores.iter().sum::<f64>() / batch_size as f64;

        self.state.update(
            mean,
            batch_size,
            FormatOptions::new(self.name()).precision(5),
        )
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for ThresholdedIoUMetric<B> {
    fn value(&self) -> f64 {
        self.state.value()
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::TensorData;

    use super::*;
    use crate::tests::{FakeMetadata, TestBackend};

    #[test]
    fn quantize_maps_breakpoints_exactly() {
        assert_eq!(threshold_quantize(0.5), 0.0);
        assert_eq!(threshold_quantize(0.75), 0.5);
        assert_eq!(threshold_quantize(1.0), 1.0);
        // Out-of-range values clamp instead of extrapolating.
        assert_eq!(threshold_quantize(0.3), 0.0);
        assert_eq!(threshold_quantize(1.2), 1.0);
    }

    #[test]
    fn quantize_steps_by_tenths() {
        // Each 0.05 of IoU past 0.5 is worth one 0.1 step.
        assert_eq!(threshold_quantize(0.52), 0.1);
        assert_eq!(threshold_quantize(0.57), 0.2);
        assert_eq!(threshold_quantize(0.98), 1.0);
    }

    #[test]
    fn identical_masks_score_one() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[[[true, true], [false, true]]]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([[[true, true], [false, true]]]),
            &device,
        );

        let scores = iou_thresholded_batch(outputs, labels);

        assert_eq!(scores, vec![1.0]);
    }

    #[test]
    fn disjoint_masks_score_zero() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[[[true, true], [false, false]]]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([[[false, false], [true, true]]]),
            &device,
        );

        let scores = iou_thresholded_batch(outputs, labels);

        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn partial_overlap_lands_in_middle_bucket() {
        let device = Default::default();

        // intersection = 2, union = 3, iou ~= 0.667 -> bucket 0.4
        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[[[true, true], [false, false]]]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([[[true, true], [true, false]]]),
            &device,
        );

        let scores = iou_thresholded_batch(outputs, labels);

        assert_eq!(scores, vec![0.4]);
    }

    #[test]
    fn batch_scores_each_example_independently() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([
                [[[true, true], [true, true]]],
                [[[true, true], [false, false]]],
            ]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([
                [[true, true], [true, true]],
                [[false, false], [true, true]],
            ]),
            &device,
        );

        let scores = iou_thresholded_batch(outputs, labels);

        assert_eq!(scores, vec![1.0, 0.0]);
    }

    #[test]
    fn empty_masks_score_one_not_nan() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[[[false, false], [false, false]]]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([[[false, false], [false, false]]]),
            &device,
        );

        let scores = iou_thresholded_batch(outputs, labels);

        // (0 + SMOOTH) / (0 + SMOOTH) = 1.0, quantized to 1.0.
        assert_eq!(scores, vec![1.0]);
    }

    #[test]
    #[should_panic = "at least one example"]
    fn empty_batch_panics() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::empty([0, 1, 2, 2], &device);
        let labels = Tensor::<TestBackend, 3, Bool>::empty([0, 2, 2], &device);

        let _scores = iou_thresholded_batch(outputs, labels);
    }

    #[test]
    #[should_panic = "singleton channel axis"]
    fn multi_channel_predictions_panic() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[
                [[true, true], [false, false]],
                [[true, true], [false, false]],
            ]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([[[true, true], [false, false]]]),
            &device,
        );

        let _scores = iou_thresholded_batch(outputs, labels);
    }

    #[test]
    #[should_panic = "must match labels"]
    fn mismatched_batch_sizes_panic() {
        let device = Default::default();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([[[[true, true], [false, false]]]]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([
                [[true, true], [false, false]],
                [[true, true], [false, false]],
            ]),
            &device,
        );

        let _scores = iou_thresholded_batch(outputs, labels);
    }

    #[test]
    fn metric_tracks_running_mean() {
        let device = Default::default();
        let mut metric = ThresholdedIoUMetric::<TestBackend>::new();

        let outputs = Tensor::<TestBackend, 4, Bool>::from_data(
            TensorData::from([
                [[[true, true], [true, true]]],
                [[[true, true], [false, false]]],
            ]),
            &device,
        );
        let labels = Tensor::<TestBackend, 3, Bool>::from_data(
            TensorData::from([
                [[true, true], [true, true]],
                [[false, false], [true, true]],
            ]),
            &device,
        );

        let input = ThresholdedIoUInput::new(outputs, labels);
        metric.update(&input, &MetricMetadata::fake());

        // Scores [1.0, 0.0] -> mean 0.5.
        assert!((metric.value() - 0.5).abs() < 1e-9);
    }
}
