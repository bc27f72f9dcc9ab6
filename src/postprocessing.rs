// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing of raw classifier scores.

use ndarray::Array1;

use crate::error::{ClassifierError, Result};
use crate::results::Probs;

/// Tolerance on the score sum before the scores are treated as logits.
const SOFTMAX_SUM_TOLERANCE: f32 = 0.1;

/// Turn raw model output into class probabilities.
///
/// NaN scores become 0 and infinities saturate to the largest finite value
/// (FP16 outputs overflow easily). If the scores do not already sum to ~1
/// they are treated as logits and passed through a softmax. Every
/// probability is clamped to [0, 1].
///
/// # Arguments
///
/// * `output` - Flat output tensor data.
/// * `output_shape` - Shape of the output tensor, e.g. `[1, 5]`.
/// * `num_classes` - Number of classes the caller expects.
///
/// # Errors
///
/// Returns an error if the output does not hold exactly one score per class.
pub fn postprocess_classify(
    output: &[f32],
    output_shape: &[usize],
    num_classes: usize,
) -> Result<Probs> {
    let width = output_shape.last().copied().unwrap_or(output.len());
    if output.len() != num_classes || width != num_classes {
        return Err(ClassifierError::PostProcessingError(format!(
            "model output has shape {output_shape:?}, expected {num_classes} class scores"
        )));
    }

    let mut probs: Vec<f32> = output
        .iter()
        .map(|&v| {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(f32::MIN, f32::MAX)
            }
        })
        .collect();

    let sum: f32 = probs.iter().sum();
    let in_unit_range = probs.iter().all(|v| (0.0..=1.0).contains(v));
    if !in_unit_range || (sum - 1.0).abs() > SOFTMAX_SUM_TOLERANCE {
        probs = softmax(&probs);
    }

    for p in &mut probs {
        *p = p.clamp(0.0, 1.0);
    }

    Ok(Probs::new(Array1::from_vec(probs)))
}

/// Numerically stable softmax over finite values.
///
/// Falls back to a uniform distribution if the exponentials don't sum to a
/// positive finite number.
fn softmax(values: &[f32]) -> Vec<f32> {
    let max_val = values.iter().copied().fold(f32::MIN, f32::max);
    let exp_vals: Vec<f32> = values.iter().map(|&v| (v - max_val).exp()).collect();
    let exp_sum: f32 = exp_vals.iter().sum();
    if exp_sum > 0.0 && exp_sum.is_finite() {
        exp_vals.iter().map(|&v| v / exp_sum).collect()
    } else {
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / values.len() as f32;
        vec![uniform; values.len()]
    }
}
