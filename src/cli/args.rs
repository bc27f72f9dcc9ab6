// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::Parser;

use crate::preprocessing::{Interpolation, TensorLayout};

/// One-line usage printed when the arguments don't parse.
pub const USAGE: &str = "Usage: waste-classifier <model_path> <image_path>";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"Output:
    A single JSON line on stdout, e.g.
    {"success":true,"category":"Glass","confidence":0.91,"all_predictions":[...]}
    {"success":false,"error":"Image not found: bottle.jpg"}

Examples:
    waste-classifier waste.onnx bottle.jpg
    waste-classifier waste.onnx can.png --interpolation bilinear --threads 2
    waste-classifier resnet_waste.onnx box.jpg --layout nchw --imgsz 256 --verbose"#)]
pub struct Cli {
    /// Path to the ONNX classification model
    pub model_path: PathBuf,

    /// Path to the image to classify
    pub image_path: PathBuf,

    /// Square input size, overriding the model's declared input shape
    #[arg(long)]
    pub imgsz: Option<usize>,

    /// ONNX Runtime intra-op threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Resize filter (nearest, bilinear)
    #[arg(long, default_value_t = Interpolation::Nearest)]
    pub interpolation: Interpolation,

    /// Input tensor layout (nhwc, nchw), detected from the model if omitted
    #[arg(long)]
    pub layout: Option<TensorLayout>,

    /// Log model details and timings to stderr
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_defaults() {
        let cli = Cli::parse_from(["app", "waste.onnx", "bottle.jpg"]);
        assert_eq!(cli.model_path, PathBuf::from("waste.onnx"));
        assert_eq!(cli.image_path, PathBuf::from("bottle.jpg"));
        assert_eq!(cli.imgsz, None);
        assert_eq!(cli.threads, 0);
        assert_eq!(cli.interpolation, Interpolation::Nearest);
        assert_eq!(cli.layout, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_custom_options() {
        let cli = Cli::parse_from([
            "app",
            "m.onnx",
            "i.jpg",
            "--imgsz",
            "256",
            "--threads",
            "2",
            "--interpolation",
            "bilinear",
            "--layout",
            "nchw",
            "--verbose",
        ]);
        assert_eq!(cli.imgsz, Some(256));
        assert_eq!(cli.threads, 2);
        assert_eq!(cli.interpolation, Interpolation::Bilinear);
        assert_eq!(cli.layout, Some(TensorLayout::Nchw));
        assert!(cli.verbose);
    }

    #[test]
    fn test_wrong_arg_count_is_error() {
        assert!(Cli::try_parse_from(["app", "only-model.onnx"]).is_err());
        assert!(Cli::try_parse_from(["app", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_invalid_layout_is_error() {
        assert!(Cli::try_parse_from(["app", "m.onnx", "i.jpg", "--layout", "hwc"]).is_err());
    }
}
