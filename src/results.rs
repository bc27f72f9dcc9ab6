// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types for classifier output.
//!
//! [`Classification`] is what the model returns; [`ClassificationOutput`] is
//! the JSON record printed by the CLI and parsed back by the subprocess bridge.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent on postprocessing.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Get total time in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Classification probabilities.
#[derive(Debug, Clone)]
pub struct Probs {
    /// Probability per class, in model output order.
    pub data: Array1<f32>,
}

impl Probs {
    /// Create a new Probs instance.
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Index of the most probable class. Ties resolve to the lowest index
    /// and NaN entries are skipped.
    #[must_use]
    pub fn top1(&self) -> usize {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                Some((_, b)) if v <= b => best,
                _ => Some((i, v)),
            })
            .map_or(0, |(i, _)| i)
    }

    /// Indices of the `k` most probable classes, best first.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.data.len()).collect();
        indices.sort_by(|&a, &b| {
            self.data[b]
                .partial_cmp(&self.data[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        indices.truncate(k);
        indices
    }

    /// Probability of the top-1 class.
    #[must_use]
    pub fn top1conf(&self) -> f32 {
        self.data.get(self.top1()).copied().unwrap_or(0.0)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no scores at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One category and its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// The category.
    pub category: Category,
    /// Probability in [0, 1].
    pub confidence: f32,
}

/// Outcome of a single forward pass.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Per-category probabilities, indexed like [`Category::ALL`].
    pub probs: Probs,
    /// Timing information.
    pub speed: Speed,
}

impl Classification {
    /// Create a classification from probabilities with one entry per category.
    #[must_use]
    pub const fn new(probs: Probs, speed: Speed) -> Self {
        Self { probs, speed }
    }

    /// The most probable category.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::from_index(self.probs.top1()).unwrap_or(Category::Trash)
    }

    /// Confidence of [`Self::category`].
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.probs.top1conf()
    }

    /// Every category with its confidence, in model output order.
    #[must_use]
    pub fn all_predictions(&self) -> Vec<CategoryScore> {
        Category::ALL
            .iter()
            .zip(self.probs.data.iter())
            .map(|(&category, &confidence)| CategoryScore {
                category,
                confidence,
            })
            .collect()
    }

    /// Short summary like "Glass 0.91, Paper 0.05, Metal 0.02".
    #[must_use]
    pub fn summary(&self, k: usize) -> String {
        self.probs
            .top_k(k)
            .iter()
            .filter_map(|&i| Category::from_index(i).map(|c| format!("{c} {:.2}", self.probs.data[i])))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// JSON record written to stdout by the CLI.
///
/// On success `category`, `confidence` and `all_predictions` are present; on
/// failure only `error` is. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutput {
    /// Whether classification succeeded.
    pub success: bool,
    /// Top category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Confidence of the top category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Confidence for every category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_predictions: Option<Vec<CategoryScore>>,
    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationOutput {
    /// Successful record built from a classification.
    #[must_use]
    pub fn success(classification: &Classification) -> Self {
        Self {
            success: true,
            category: Some(classification.category()),
            confidence: Some(classification.confidence()),
            all_predictions: Some(classification.all_predictions()),
            error: None,
        }
    }

    /// Failure record carrying `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            category: None,
            confidence: None,
            all_predictions: None,
            error: Some(message.into()),
        }
    }

    /// Serialize as a single line of JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a record produced by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid record.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<&Classification> for ClassificationOutput {
    fn from(classification: &Classification) -> Self {
        Self::success(classification)
    }
}
