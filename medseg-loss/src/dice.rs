//! Differentiable Dice coefficient.
//!
//! Computes the Dice similarity between a predicted probability mask and a
//! binary ground-truth mask, with a hand-derived gradient for the prediction:
//!
//! ```text
//! intersection = sum(input * target)
//! union        = sum(input) + sum(target) + eps
//! dice         = (2 * intersection + eps) / union
//! ```
//!
//! Note that the Dice denominator does not subtract the intersection; that is
//! the standard Dice definition and differs deliberately from the soft IoU
//! denominator in [`crate::IoUScore`].
//!
//! The forward pass returns the score together with a [`DiceBackward`]
//! context holding exactly what the gradient formula needs. The context is
//! consumed by value, so each forward evaluation supports at most one
//! backward evaluation.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, ElementConversion, Tensor},
};

/// Configuration for creating a [Dice scorer](DiceScore).
#[derive(Config, Debug)]
pub struct DiceScoreConfig {
    /// Small epsilon value to avoid division by zero. Default: 1e-4
    #[config(default = 1e-4)]
    pub eps: f64,
}

impl DiceScoreConfig {
    /// Initialize [Dice scorer](DiceScore).
    pub fn init(&self) -> DiceScore {
        self.assertions();
        DiceScore { eps: self.eps }
    }

    fn assertions(&self) {
        assert!(
            self.eps > 0.0,
            "Epsilon for DiceScore must be positive, got {}",
            self.eps
        );
    }
}

/// Saved forward state for one backward evaluation of [`DiceScore`].
///
/// Holds the ground-truth mask and the scalar intersection/union of a single
/// forward call. [`DiceScore::backward`] takes it by value: computing a
/// second gradient requires a new forward pass.
#[derive(Debug, Clone)]
pub struct DiceBackward<B: Backend, const D: usize> {
    target: Tensor<B, D>,
    intersection: f64,
    union: f64,
}

/// Differentiable Dice coefficient scorer.
///
/// Scores a single prediction/target pair in `forward`, a batch of pairs in
/// `forward_batch`, and produces the prediction gradient in `backward`.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct DiceScore {
    /// Small epsilon value to avoid division by zero.
    pub eps: f64,
}

impl Default for DiceScore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for DiceScore {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("eps", &self.eps).optional()
    }
}

impl DiceScore {
    /// Create a new Dice scorer with default configuration.
    pub fn new() -> Self {
        DiceScoreConfig::new().init()
    }

    /// Compute the Dice coefficient for a single prediction/target pair.
    ///
    /// All elements are reduced regardless of shape, so the score is
    /// invariant to reshaping either mask.
    ///
    /// # Shapes
    ///
    /// - input: `[...dims]` (any shape)
    /// - target: `[...dims]` (same shape as input)
    /// - output: `[1]`, plus the saved state for one `backward` call
    pub fn forward<const D: usize, B: Backend>(
        &self,
        input: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> (Tensor<B, 1>, DiceBackward<B, D>) {
        self.assertions(&input, &target);

        let intersection = (input.clone() * target.clone()).sum();
        let union = (input.sum() + target.clone().sum()).add_scalar(self.eps);

        let score = intersection
            .clone()
            .mul_scalar(2.0)
            .add_scalar(self.eps)
            .div(union.clone());

        let state = DiceBackward {
            target,
            intersection: intersection.into_scalar().elem::<f64>(),
            union: union.into_scalar().elem::<f64>(),
        };

        (score, state)
    }

    /// Compute the gradient of the Dice coefficient for one forward call.
    ///
    /// `grad_output` is the upstream gradient with respect to the score.
    /// `needs_input_grad` mirrors the `(input, target)` argument order: the
    /// prediction gradient is only computed when `needs_input_grad[0]` is
    /// set. The target is ground truth and is never differentiated, so the
    /// second returned gradient is always `None`.
    pub fn backward<const D: usize, B: Backend>(
        &self,
        state: DiceBackward<B, D>,
        grad_output: f64,
        needs_input_grad: [bool; 2],
    ) -> (Option<Tensor<B, D>>, Option<Tensor<B, D>>) {
        let DiceBackward {
            target,
            intersection,
            union,
        } = state;

        // d(dice)/d(input_i) = 2 * (target_i * union - intersection) / union^2
        let grad_input = needs_input_grad[0].then(|| {
            target
                .mul_scalar(union)
                .sub_scalar(intersection)
                .mul_scalar(grad_output * 2.0 / (union * union))
        });

        (grad_input, None)
    }

    /// Compute the average Dice coefficient over a batch of pairs.
    ///
    /// The accumulator is materialized on the given device. The batch must
    /// contain at least one pair and both sequences must have equal length.
    ///
    /// # Shapes
    ///
    /// - inputs: sequence of `[...dims]` tensors
    /// - targets: sequence of `[...dims]` tensors, pairwise matching inputs
    /// - output: `[1]`
    pub fn forward_batch<const D: usize, B: Backend>(
        &self,
        inputs: Vec<Tensor<B, D>>,
        targets: Vec<Tensor<B, D>>,
        device: &B::Device,
    ) -> Tensor<B, 1> {
        assert!(
            !inputs.is_empty(),
            "Batch for DiceScore must contain at least one example"
        );
        assert_eq!(
            inputs.len(),
            targets.len(),
            "Number of predictions ({}) must match number of targets ({})",
            inputs.len(),
            targets.len()
        );

        let count = inputs.len();
        let mut sum = Tensor::<B, 1>::zeros([1], device);
        for (input, target) in inputs.into_iter().zip(targets) {
            let (score, _) = self.forward(input, target);
            sum = sum + score;
        }

        sum.div_scalar(count as f64)
    }

    fn assertions<const D: usize, B: Backend>(&self, input: &Tensor<B, D>, target: &Tensor<B, D>) {
        let input_dims = input.dims();
        let target_dims = target.dims();
        assert_eq!(
            input_dims, target_dims,
            "Shape of prediction ({input_dims:?}) must match target ({target_dims:?})"
        );
    }
}
