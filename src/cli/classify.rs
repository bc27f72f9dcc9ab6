// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::cli::args::Cli;
use crate::results::ClassificationOutput;
use crate::{InferenceConfig, WasteClassifier, verbose};

/// Classify one image and build the JSON record.
///
/// Missing files are checked before the model is touched, model first.
/// Every later failure is turned into a failure record.
#[must_use]
pub fn run_classification(args: &Cli) -> ClassificationOutput {
    if !args.model_path.exists() {
        return ClassificationOutput::failure(format!(
            "Model not found: {}",
            args.model_path.display()
        ));
    }
    if !args.image_path.exists() {
        return ClassificationOutput::failure(format!(
            "Image not found: {}",
            args.image_path.display()
        ));
    }

    let mut config = InferenceConfig::new()
        .with_threads(args.threads)
        .with_interpolation(args.interpolation);
    if let Some(sz) = args.imgsz {
        config = config.with_imgsz(sz, sz);
    }
    if let Some(layout) = args.layout {
        config = config.with_layout(layout);
    }

    let mut model = match WasteClassifier::load_with_config(&args.model_path, config) {
        Ok(m) => m,
        Err(e) => return ClassificationOutput::failure(e.to_string()),
    };

    let (h, w) = model.input_size();
    verbose!(
        "Model {}: {} classes, imgsz=({h}, {w}), layout={}",
        args.model_path.display(),
        model.categories().len(),
        model.layout()
    );

    match model.classify(&args.image_path) {
        Ok(classification) => {
            verbose!(
                "image {}: {}",
                args.image_path.display(),
                classification.summary(3)
            );
            verbose!(
                "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms postprocess",
                classification.speed.preprocess.unwrap_or(0.0),
                classification.speed.inference.unwrap_or(0.0),
                classification.speed.postprocess.unwrap_or(0.0)
            );
            ClassificationOutput::success(&classification)
        }
        Err(e) => ClassificationOutput::failure(e.to_string()),
    }
}
