//! Soft (continuous) Intersection over Union.
//!
//! Computes a differentiable IoU score between a predicted probability mask
//! and a binary ground-truth mask:
//!
//! ```text
//! intersection = sum(input * target)
//! union        = sum(input) + sum(target) + eps - intersection
//! iou          = (intersection + eps) / union
//! ```
//!
//! Unlike [`crate::DiceScore`], the denominator subtracts the intersection;
//! that is the standard IoU definition. This scorer is forward-only: it is
//! built from elementary tensor operations and needs no custom gradient.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor},
};

/// Configuration for creating an [IoU scorer](IoUScore).
#[derive(Config, Debug)]
pub struct IoUScoreConfig {
    /// Small epsilon value to avoid division by zero. Default: 1e-4
    #[config(default = 1e-4)]
    pub eps: f64,
}

impl IoUScoreConfig {
    /// Initialize [IoU scorer](IoUScore).
    pub fn init(&self) -> IoUScore {
        self.assertions();
        IoUScore { eps: self.eps }
    }

    fn assertions(&self) {
        assert!(
            self.eps > 0.0,
            "Epsilon for IoUScore must be positive, got {}",
            self.eps
        );
    }
}

/// Soft Intersection over Union scorer.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct IoUScore {
    /// Small epsilon value to avoid division by zero.
    pub eps: f64,
}

impl Default for IoUScore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for IoUScore {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("eps", &self.eps).optional()
    }
}

impl IoUScore {
    /// Create a new IoU scorer with default configuration.
    pub fn new() -> Self {
        IoUScoreConfig::new().init()
    }

    /// Compute the soft IoU score for a single prediction/target pair.
    ///
    /// # Shapes
    ///
    /// - input: `[...dims]` (any shape)
    /// - target: `[...dims]` (same shape as input)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        input: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        self.assertions(&input, &target);

        let intersection = (input.clone() * target.clone()).sum();
        let union = (input.sum() + target.sum())
            .add_scalar(self.eps)
            .sub(intersection.clone());

        intersection.add_scalar(self.eps).div(union)
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
