//! Dice coefficient metric.
//!
//! Tracks the batch-averaged Dice coefficient across an epoch, the score the
//! surrounding training loop logs for validation and test rounds. Each
//! update slices the 4-D batch into per-example masks and reuses the
//! [`DiceScore`] batch reduction from `medseg-loss`.

use core::marker::PhantomData;

use burn::{
    prelude::*,
    tensor::{backend::Backend, cast::ToElement, Tensor},
    train::metric::{
        state::{FormatOptions, NumericMetricState},
        Metric, MetricEntry, MetricMetadata, Numeric,
    },
};
use medseg_loss::DiceScore;

use crate::input::DiceInput;

// --- Dice Metric ---

/// Epoch-level batch-averaged Dice metric.
#[derive(Default)]
pub struct DiceMetric<B: Backend> {
    state: NumericMetricState,
    score: DiceScore,
    _b: PhantomData<B>,
}

impl<B: Backend> DiceMetric<B> {
    /// Creates a new Dice metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Dice metric with a custom scorer.
    pub fn with_score(score: DiceScore) -> Self {
        Self {
            state: NumericMetricState::default(),
            score,
            _b: PhantomData,
        }
    }
}

impl<B: Backend> Metric for DiceMetric<B> {
    type Input = DiceInput<B>;

    fn name(&self) -> String {
        "Dice".to_owned()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let [batch_size, ..] = item.predictions.dims();
        let [target_batch_size, ..] = item.targets.dims();
        assert_eq!(
            batch_size, target_batch_size,
            "Batch size of predictions ({batch_size}) must match targets ({target_batch_size})"
        );
        let device = item.predictions.device();

        let mut inputs = Vec::with_capacity(batch_size);
        let mut targets = Vec::with_capacity(batch_size);
        for b in 0..batch_size {
            let pred: Tensor<B, 3> = item
                .predictions
                .clone()
                .slice(s![b..=b, .., .., ..])
                .squeeze(0);
            let gt: Tensor<B, 3> = item.targets.clone().slice(s![b..=b, .., .., ..]).squeeze(0);
            inputs.push(pred);
            targets.push(gt);
        }

        let dice = self
            .score
            .forward_batch(inputs, targets, &device)
            .into_scalar()
            .to_f64();

        self.state.update(
            dice,
            batch_size,
            FormatOptions::new(self.name()).precision(5),
        )
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for DiceMetric<B> {
    fn value(&self) -> f64 {
        self.state.value()
    }
}
