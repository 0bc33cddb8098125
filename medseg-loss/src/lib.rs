//! Overlap scoring for binary medical-image segmentation.
//!
//! This crate provides the differentiable overlap scores used to train and
//! evaluate binary segmentation models with the Burn deep learning
//! framework:
//!
//! - **[`DiceScore`]**: Dice coefficient with a hand-derived gradient,
//!   exposed as an explicit forward/backward function pair plus a batch
//!   averaging reduction
//! - **[`IoUScore`]**: soft Intersection over Union, forward-only
//!
//! Both scorers work on real-valued prediction masks (typically sigmoid
//! outputs in `[0, 1]`) against binary ground-truth masks of the same
//! shape, reduce over every element, and guard their denominators with a
//! small epsilon so empty masks never divide by zero. Dice and IoU
//! intentionally define their unions differently (Dice does not subtract
//! the intersection); see the module docs for the exact formulas.
//!
//! All scorers are backend-agnostic and configured through the `Config`
//! trait:
//!
//! ```rust
//! use medseg_loss::{DiceScoreConfig, IoUScore};
//!
//! let dice = DiceScoreConfig::new().with_eps(1e-4).init();
//! let iou = IoUScore::new();
//! ```

mod dice;
mod iou;

pub use dice::{DiceBackward, DiceScore, DiceScoreConfig};
pub use iou::{IoUScore, IoUScoreConfig};

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    pub type TestBackend = NdArray;
}
