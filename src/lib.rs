// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Waste Classifier
//!
//! Single-image waste classification on ONNX Runtime, printing one JSON line
//! per run so that other applications can call it as a subprocess.
//!
//! An image is resized to the model input (224x224 by default), normalized
//! to [0, 1], run through the model once, and scored against five fixed
//! categories: `Paper`, `Glass`, `Metal`, `Plastic`, `Trash`.
//!
//! ## CLI Usage
//!
//! ```bash
//! waste-classifier waste.onnx bottle.jpg
//! # {"success":true,"category":"Glass","confidence":0.91,"all_predictions":[...]}
//!
//! waste-classifier missing.onnx bottle.jpg
//! # {"success":false,"error":"Model not found: missing.onnx"}
//! ```
//!
//! Keras models are converted once with `python -m tf2onnx.convert --keras model.h5`.
//! The input layout (NHWC or NCHW) and size are read from the model.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use waste_classifier::WasteClassifier;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut model = WasteClassifier::load("waste.onnx")?;
//!     let classification = model.classify("bottle.jpg")?;
//!
//!     for score in classification.all_predictions() {
//!         println!("{} {:.2}", score.category, score.confidence);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Host Integration
//!
//! | Piece | Use |
//! |-------|-----|
//! | [`SubprocessClassifier`] | Run the CLI per image and parse its JSON |
//! | [`ClassificationManager`] | Debounce a stream of results into one decision per item |
//! | [`StatsFile`] | CSV log of decisions, reloaded on startup |
//! | [`SerialLink`] | Send the decision to the sorting controller |
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | [`WasteClassifier`] for loading models and running inference |
//! | [`results`] | [`Classification`] and the JSON record [`ClassificationOutput`] |
//! | [`inference`] | [`InferenceConfig`] for customizing inference settings |
//! | [`preprocessing`] | Resize and normalize images into tensors |
//! | [`postprocessing`] | Raw scores to probabilities |
//! | [`category`] | The fixed [`Category`] set |
//! | [`error`] | Error types ([`ClassifierError`], [`Result`]) |

// Modules
pub mod bridge;
pub mod category;
pub mod cli;
pub mod error;
pub mod inference;
pub mod manager;
pub mod model;
pub mod postprocessing;
pub mod preprocessing;
pub mod protocol;
pub mod results;
pub mod stats;

// Re-export main types for convenience
pub use bridge::SubprocessClassifier;
pub use category::{Category, CategoryCounts};
pub use error::{ClassifierError, Result};
pub use inference::InferenceConfig;
pub use manager::{ClassificationManager, ImageClassifier};
pub use model::WasteClassifier;
pub use protocol::SerialLink;
pub use results::{CategoryScore, Classification, ClassificationOutput, Probs, Speed};
pub use stats::StatsFile;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
