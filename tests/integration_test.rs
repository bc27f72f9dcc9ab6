// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the waste classifier binary and library

use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::Array1;
use waste_classifier::preprocessing::TensorLayout;
use waste_classifier::protocol::decode_frame;
use waste_classifier::{
    Category, Classification, ClassificationManager, ClassificationOutput, Probs, SerialLink,
    Speed, StatsFile, SubprocessClassifier, WasteClassifier,
};

const BIN: &str = env!("CARGO_BIN_EXE_waste-classifier");

/// Tiny models from `tests/fixtures/make_fixtures.py`: mean RGB through a fixed
/// Gemm + Softmax, so red scores Paper, green Glass and blue Metal.
fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn solid_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(16, 12, image::Rgb(color))
        .save(&path)
        .unwrap();
    path
}

fn run(args: &[&str]) -> (String, bool) {
    let (stdout, _, ok) = run_full(args);
    (stdout, ok)
}

fn run_full(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(BIN).args(args).output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.success(),
    )
}

fn assert_valid_success(output: &ClassificationOutput, expected: Category) {
    assert!(output.success, "unexpected failure: {:?}", output.error);
    assert!(output.error.is_none());
    assert_eq!(output.category, Some(expected));

    let all = output.all_predictions.as_ref().unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all.iter().map(|s| s.category).collect::<Vec<_>>(), Category::ALL.to_vec());
    assert!(all.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));

    let confidence = output.confidence.unwrap();
    let max = all.iter().map(|s| s.confidence).fold(f32::MIN, f32::max);
    assert!((confidence - max).abs() < f32::EPSILON);
    let top = all.iter().find(|s| s.category == expected).unwrap();
    assert!((top.confidence - confidence).abs() < f32::EPSILON);
}

#[test]
fn test_missing_model_json() {
    let (stdout, ok) = run(&["/no/such/waste.onnx", "/no/such/bottle.jpg"]);
    assert!(ok);
    assert_eq!(
        stdout.trim(),
        r#"{"success":false,"error":"Model not found: /no/such/waste.onnx"}"#
    );
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_missing_image_json() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("waste.onnx");
    std::fs::write(&model, b"placeholder").unwrap();

    let (stdout, ok) = run(&[model.to_str().unwrap(), "/no/such/bottle.jpg"]);
    assert!(ok);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert!(!output.success);
    assert_eq!(
        output.error.as_deref(),
        Some("Image not found: /no/such/bottle.jpg")
    );
}

#[test]
fn test_unloadable_model_reported_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("waste.onnx");
    let image = dir.path().join("bottle.png");
    std::fs::write(&model, b"not an onnx graph").unwrap();
    image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 30]))
        .save(&image)
        .unwrap();

    let (stdout, ok) = run(&[model.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(ok);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert!(!output.success);
    assert!(output.category.is_none());
    assert!(output.error.is_some());
}

#[test]
fn test_classify_nhwc_model() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_png(dir.path(), "bottle.png", [0, 255, 0]);
    let model = fixture("tiny_nhwc.onnx");

    let (stdout, ok) = run(&[model.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), 1);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert_valid_success(&output, Category::Glass);
    // logits [0, 4, 0, 0.5, 0.5] -> softmax
    assert!((output.confidence.unwrap() - 0.911).abs() < 0.01);
}

#[test]
fn test_classify_nchw_model_bilinear() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_png(dir.path(), "box.png", [255, 0, 0]);
    let model = fixture("tiny_nchw.onnx");

    let (stdout, ok) = run(&[
        model.to_str().unwrap(),
        image.to_str().unwrap(),
        "--interpolation",
        "bilinear",
    ]);
    assert!(ok);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert_valid_success(&output, Category::Paper);
}

#[test]
fn test_classify_half_precision_model() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_png(dir.path(), "can.png", [0, 0, 255]);
    let model = fixture("tiny_nhwc_f16.onnx");

    let (stdout, ok) = run(&[model.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(ok);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert_valid_success(&output, Category::Metal);
}

#[test]
fn test_input_spec_read_from_session() {
    let model = WasteClassifier::load(fixture("tiny_nhwc.onnx")).unwrap();
    assert_eq!(model.layout(), TensorLayout::Nhwc);
    assert_eq!(model.input_size(), (8, 8));
    assert!(!model.input_spec().half);

    let model = WasteClassifier::load(fixture("tiny_nchw.onnx")).unwrap();
    assert_eq!(model.layout(), TensorLayout::Nchw);
    assert_eq!(model.input_size(), (8, 8));

    let model = WasteClassifier::load(fixture("tiny_nhwc_f16.onnx")).unwrap();
    assert_eq!(model.layout(), TensorLayout::Nhwc);
    assert!(model.input_spec().half);
}

#[test]
fn test_library_classify_matches_colors() {
    let dir = tempfile::tempdir().unwrap();
    let mut model = WasteClassifier::load(fixture("tiny_nhwc.onnx")).unwrap();

    for (color, expected) in [
        ([255, 0, 0], Category::Paper),
        ([0, 255, 0], Category::Glass),
        ([0, 0, 255], Category::Metal),
    ] {
        let image = solid_png(dir.path(), "item.png", color);
        let classification = model.classify(&image).unwrap();
        assert_eq!(classification.category(), expected);
        let sum: f32 = classification.probs.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(classification.speed.inference.is_some());
    }
}

#[test]
fn test_undecodable_image_reported_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("bottle.jpg");
    std::fs::write(&image, b"not a jpeg").unwrap();

    let model = fixture("tiny_nhwc.onnx");
    let (stdout, ok) = run(&[model.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(ok);
    let output = ClassificationOutput::from_json(stdout.trim()).unwrap();
    assert!(!output.success);
    assert!(output.error.unwrap().starts_with("Image error: "));
}

#[test]
fn test_bad_option_reports_reason() {
    let (stdout, stderr, ok) = run_full(&["m.onnx", "i.jpg", "--layout", "hwc"]);
    assert!(ok);
    assert!(stdout.starts_with("Usage:"));
    assert!(stderr.contains("hwc"));

    let (stdout, stderr, _) = run_full(&["m.onnx", "i.jpg", "--imgsz", "abc"]);
    assert!(stdout.starts_with("Usage:"));
    assert!(stderr.contains("abc"));
}

#[test]
fn test_wrong_arg_count_prints_usage() {
    let (stdout, ok) = run(&["only-model.onnx"]);
    assert!(ok);
    assert!(stdout.starts_with("Usage:"));

    let (stdout, ok) = run(&[]);
    assert!(ok);
    assert!(stdout.starts_with("Usage:"));
}

#[test]
fn test_subprocess_bridge_against_binary() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("waste.onnx");
    std::fs::write(&model, b"placeholder").unwrap();

    let bridge = SubprocessClassifier::new(BIN, &model).unwrap();
    let output = bridge.classify(dir.path().join("missing.jpg"));
    assert!(!output.success);
    assert!(output.error.unwrap().starts_with("Image not found: "));

    let handle = bridge.classify_in_background(dir.path().join("missing.jpg"));
    assert!(!handle.join().unwrap().success);
}

#[test]
fn test_subprocess_bridge_success() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_png(dir.path(), "bottle.png", [0, 255, 0]);

    let bridge = SubprocessClassifier::new(BIN, fixture("tiny_nhwc.onnx")).unwrap();
    let output = bridge.classify(&image);
    assert_valid_success(&output, Category::Glass);
}

#[test]
fn test_manager_with_real_model() {
    let dir = tempfile::tempdir().unwrap();
    let image = solid_png(dir.path(), "can.png", [0, 0, 255]);
    let model = WasteClassifier::load(fixture("tiny_nhwc.onnx")).unwrap();

    let mut manager = ClassificationManager::new(model);
    assert_eq!(manager.classify_image(&image), None);
    assert_eq!(manager.classify_image(&image), Some(Category::Metal));
    assert_eq!(manager.counts().get(Category::Metal), 1);
}

#[test]
fn test_success_record_invariants() {
    let probs = Probs::new(Array1::from(vec![0.05, 0.1, 0.6, 0.2, 0.05]));
    let classification = Classification::new(probs, Speed::default());
    let output = ClassificationOutput::success(&classification);

    assert!(output.success);
    assert_eq!(output.category, Some(Category::Metal));
    let all = output.all_predictions.as_ref().unwrap();
    assert_eq!(all.len(), 5);
    let names: Vec<_> = all.iter().map(|s| s.category).collect();
    assert_eq!(names, Category::ALL.to_vec());
    let max = all.iter().map(|s| s.confidence).fold(f32::MIN, f32::max);
    assert!((output.confidence.unwrap() - max).abs() < f32::EPSILON);

    let json = output.to_json().unwrap();
    assert!(json.starts_with(r#"{"success":true,"category":"Metal","confidence":"#));
    assert!(!json.contains("error"));
    assert_eq!(ClassificationOutput::from_json(&json).unwrap(), output);
}

#[test]
fn test_manager_pipeline_with_stats_and_serial() {
    struct Fixed(Vec<Category>);

    impl waste_classifier::ImageClassifier for Fixed {
        fn classify_path(&mut self, _image: &std::path::Path) -> ClassificationOutput {
            let category = self.0.remove(0);
            let mut data = vec![0.0; 5];
            data[category.index()] = 1.0;
            let c = Classification::new(Probs::new(Array1::from(data)), Speed::default());
            ClassificationOutput::success(&c)
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    let mut manager = ClassificationManager::with_stats_dir(
        Fixed(vec![Category::Paper, Category::Plastic, Category::Plastic]),
        dir.path(),
    )
    .unwrap();
    manager.set_callback(move |category| {
        let mut link = SerialLink::new(Vec::new());
        link.send_classification(Some(category)).unwrap();
        tx.send(link.into_inner()).unwrap();
    });

    assert_eq!(manager.classify_image("a.jpg"), None);
    assert_eq!(manager.classify_image("b.jpg"), None);
    assert_eq!(manager.classify_image("c.jpg"), Some(Category::Plastic));

    let frame = rx.recv().unwrap();
    assert_eq!(decode_frame(&frame).unwrap(), Some(Category::Plastic));

    let counts = StatsFile::open(dir.path()).unwrap().load_counts().unwrap();
    assert_eq!(counts.get(Category::Plastic), 1);
    assert_eq!(counts.total(), 1);
}
