// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classifier model loading and inference.
//!
//! This module provides [`WasteClassifier`], which wraps an ONNX Runtime
//! session and runs one forward pass per image.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::tensor::TensorElementType;
use ort::value::TensorRef;

use crate::category::Category;
use crate::error::{ClassifierError, Result};
use crate::inference::InferenceConfig;
use crate::manager::ImageClassifier;
use crate::postprocessing::postprocess_classify;
use crate::preprocessing::{
    DEFAULT_IMGSZ, PreprocessResult, TensorLayout, load_image, preprocess_image, tensor_f32_to_f16,
};
use crate::results::{Classification, ClassificationOutput, Speed};

/// Shape and precision the model expects for its input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Tensor layout.
    pub layout: TensorLayout,
    /// Input size (height, width).
    pub imgsz: (usize, usize),
    /// Whether the model takes FP16 input.
    pub half: bool,
}

impl InputSpec {
    /// Derive the input spec from a declared ONNX input shape.
    ///
    /// Dynamic dimensions are negative in ONNX and are ignored. A 4-D shape
    /// with 3 as the last dimension is NHWC; with 3 as the second it is NCHW.
    /// Explicit settings in `config` always win.
    #[must_use]
    pub fn from_shape(shape: &[i64], half: bool, config: &InferenceConfig) -> Self {
        let detected_layout = match shape {
            [_, _, _, 3] => Some(TensorLayout::Nhwc),
            [_, 3, _, _] => Some(TensorLayout::Nchw),
            _ => None,
        };
        let layout = config
            .layout
            .or(detected_layout)
            .unwrap_or_default();

        let (h, w) = match (layout, shape) {
            (TensorLayout::Nhwc, [_, h, w, _]) | (TensorLayout::Nchw, [_, _, h, w]) => (*h, *w),
            _ => (-1, -1),
        };
        let declared = usize::try_from(h)
            .ok()
            .zip(usize::try_from(w).ok())
            .filter(|&(h, w)| h > 0 && w > 0);

        let imgsz = config.imgsz.or(declared).unwrap_or(DEFAULT_IMGSZ);

        Self {
            layout,
            imgsz,
            half,
        }
    }
}

/// Waste classification model.
///
/// # Example
///
/// ```no_run
/// use waste_classifier::WasteClassifier;
///
/// let mut model = WasteClassifier::load("waste.onnx")?;
/// let classification = model.classify("bottle.jpg")?;
/// println!("{} {:.2}", classification.category(), classification.confidence());
/// # Ok::<(), waste_classifier::ClassifierError>(())
/// ```
pub struct WasteClassifier {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
    /// Expected input tensor.
    input_spec: InputSpec,
    /// Inference configuration.
    config: InferenceConfig,
}

impl WasteClassifier {
    /// Load a classifier from an ONNX file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a classifier with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, can't be loaded, or
    /// has no inputs or outputs.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoadError(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| ClassifierError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| ClassifierError::ModelLoadError("Model has no inputs".to_string()))?;
        let input_name = input.name.clone();
        let shape: Vec<i64> = input
            .input_type
            .tensor_shape()
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        let half = input.input_type.tensor_type() == Some(TensorElementType::Float16);
        let input_spec = InputSpec::from_shape(&shape, half, &config);

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoadError("Model has no outputs".to_string()))?;

        Ok(Self {
            session,
            input_name,
            output_name,
            input_spec,
            config,
        })
    }

    /// Classify an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be loaded or inference fails.
    pub fn classify<P: AsRef<Path>>(&mut self, path: P) -> Result<Classification> {
        let img = load_image(path)?;
        self.classify_image(&img)
    }

    /// Classify a decoded image.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, inference or post-processing fails.
    pub fn classify_image(&mut self, image: &DynamicImage) -> Result<Classification> {
        let start_preprocess = Instant::now();
        let preprocessed = preprocess_image(
            image,
            self.input_spec.imgsz,
            self.config.interpolation,
            self.input_spec.layout,
        )?;
        let preprocess_time = start_preprocess.elapsed().as_secs_f64() * 1000.0;

        let start_inference = Instant::now();
        let (output, output_shape) = self.run_inference(&preprocessed)?;
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let start_postprocess = Instant::now();
        let probs = postprocess_classify(&output, &output_shape, Category::COUNT)?;
        let postprocess_time = start_postprocess.elapsed().as_secs_f64() * 1000.0;

        Ok(Classification::new(
            probs,
            Speed::new(preprocess_time, inference_time, postprocess_time),
        ))
    }

    /// Run the ONNX model on a preprocessed tensor.
    fn run_inference(&mut self, preprocessed: &PreprocessResult) -> Result<(Vec<f32>, Vec<usize>)> {
        let outputs = if self.input_spec.half {
            let half_tensor: Array4<half::f16> = tensor_f32_to_f16(&preprocessed.tensor);
            let input_tensor = TensorRef::from_array_view(&half_tensor)
                .map_err(|e| ClassifierError::InferenceError(format!("Failed to create input tensor: {e}")))?;
            self.session
                .run(ort::inputs![&self.input_name => input_tensor])
                .map_err(|e| ClassifierError::InferenceError(format!("Inference failed: {e}")))?
        } else {
            let input_contiguous = preprocessed.tensor.as_standard_layout();
            let input_tensor = TensorRef::from_array_view(&input_contiguous)
                .map_err(|e| ClassifierError::InferenceError(format!("Failed to create input tensor: {e}")))?;
            self.session
                .run(ort::inputs![&self.input_name => input_tensor])
                .map_err(|e| ClassifierError::InferenceError(format!("Inference failed: {e}")))?
        };

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ClassifierError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        // FP16 models usually emit FP16 scores too.
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let shape_vec = shape.iter().map(|&d| usize::try_from(d).unwrap_or(0)).collect();
            return Ok((data.to_vec(), shape_vec));
        }

        let (shape, data) = output
            .try_extract_tensor::<half::f16>()
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to extract output: {e}")))?;
        let shape_vec = shape.iter().map(|&d| usize::try_from(d).unwrap_or(0)).collect();
        Ok((data.iter().map(|v| v.to_f32()).collect(), shape_vec))
    }

    /// Input size (height, width) images are resized to.
    #[must_use]
    pub const fn input_size(&self) -> (usize, usize) {
        self.input_spec.imgsz
    }

    /// Input tensor layout.
    #[must_use]
    pub const fn layout(&self) -> TensorLayout {
        self.input_spec.layout
    }

    /// Full input spec.
    #[must_use]
    pub const fn input_spec(&self) -> InputSpec {
        self.input_spec
    }

    /// Categories in model output order.
    #[must_use]
    pub const fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }
}

impl ImageClassifier for WasteClassifier {
    fn classify_path(&mut self, image: &Path) -> ClassificationOutput {
        match self.classify(image) {
            Ok(classification) => ClassificationOutput::success(&classification),
            Err(e) => ClassificationOutput::failure(e.to_string()),
        }
    }
}

impl std::fmt::Debug for WasteClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasteClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_spec", &self.input_spec)
            .finish_non_exhaustive()
    }
}
