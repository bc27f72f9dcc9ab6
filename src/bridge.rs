// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Run the classifier CLI as a child process.
//!
//! Hosts that don't want ONNX Runtime in their own process (or that want a
//! crash in the model to stay contained) spawn `waste-classifier` per image
//! and parse the JSON line it prints.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

use crate::error::{ClassifierError, Result};
use crate::manager::ImageClassifier;
use crate::results::ClassificationOutput;

/// Classifier that shells out to the CLI binary.
#[derive(Debug, Clone)]
pub struct SubprocessClassifier {
    executable: PathBuf,
    model_path: PathBuf,
}

impl SubprocessClassifier {
    /// Create a bridge to `executable` using the model at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if either path doesn't exist.
    pub fn new<E: Into<PathBuf>, M: Into<PathBuf>>(executable: E, model_path: M) -> Result<Self> {
        let executable = executable.into();
        let model_path = model_path.into();

        if !executable.exists() {
            return Err(ClassifierError::ConfigError(format!(
                "Classifier executable not found: {}",
                executable.display()
            )));
        }
        if !model_path.exists() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        Ok(Self {
            executable,
            model_path,
        })
    }

    /// Path of the CLI binary.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Path of the model passed to the CLI.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Classify one image in a child process.
    ///
    /// Never fails: spawn errors, non-zero exits, empty or malformed output
    /// are all reported as failure records.
    #[must_use]
    pub fn classify<P: AsRef<Path>>(&self, image: P) -> ClassificationOutput {
        let output = match Command::new(&self.executable)
            .arg(&self.model_path)
            .arg(image.as_ref())
            .output()
        {
            Ok(output) => output,
            Err(e) => return ClassificationOutput::failure(format!("Error running classifier: {e}")),
        };

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return ClassificationOutput::failure(format!(
                "Classifier exited with code {code}: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return ClassificationOutput::failure("No output from classifier");
        }

        ClassificationOutput::from_json(stdout).unwrap_or_else(|e| {
            ClassificationOutput::failure(format!("Error running classifier: {e}"))
        })
    }

    /// Classify one image on a background thread.
    pub fn classify_in_background<P: Into<PathBuf>>(&self, image: P) -> JoinHandle<ClassificationOutput> {
        let bridge = self.clone();
        let image = image.into();
        thread::spawn(move || bridge.classify(image))
    }
}

impl ImageClassifier for SubprocessClassifier {
    fn classify_path(&mut self, image: &Path) -> ClassificationOutput {
        self.classify(image)
    }
}
