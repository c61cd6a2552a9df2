//! Headless runs of the `marker-triptych` binary.
#![cfg(not(feature = "opencv"))]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("marker-triptych").expect("binary built")
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("output dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

#[test]
fn synthetic_run_writes_one_canvas_per_frame() {
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("out");

    bin()
        .args(["--synthetic", "3", "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    let files = png_files(&out);
    assert_eq!(
        files,
        vec!["frame_00000.png", "frame_00001.png", "frame_00002.png"]
    );
    let (w, h) = image::image_dimensions(out.join(&files[0])).expect("png");
    assert_eq!((w, h), (3 * 640, 480));
}

#[test]
fn missing_source_fails_before_opening_output() {
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("out");

    bin()
        .arg("/nonexistent/clip.avi")
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error opening input video source: /nonexistent/clip.avi",
        ));
    assert!(!out.exists());
}

#[test]
fn camera_index_needs_opencv() {
    let tmp = tempdir().expect("tempdir");
    bin()
        .arg("7")
        .arg("--output-dir")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error opening input video source: 7"));
}

#[test]
fn image_directory_with_report() {
    let tmp = tempdir().expect("tempdir");
    let frames = tmp.path().join("frames");
    fs::create_dir(&frames).expect("mkdir");
    for name in ["a.png", "b.png"] {
        RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]))
            .save(frames.join(name))
            .expect("save");
    }
    fs::write(frames.join("notes.txt"), "ignored").expect("write");
    let out = tmp.path().join("out");
    let report = tmp.path().join("run.json");

    bin()
        .arg(&frames)
        .arg("--output-dir")
        .arg(&out)
        .arg("--json-report")
        .arg(&report)
        .assert()
        .success();

    assert_eq!(png_files(&out).len(), 2);
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(summary["frames"], 2);
    assert_eq!(summary["markers"], 0);
    assert_eq!(summary["stop"], "end_of_stream");
}

#[test]
fn config_file_limits_frames() {
    let tmp = tempdir().expect("tempdir");
    let config = tmp.path().join("preview.json");
    fs::write(&config, r#"{ "max_frames": 2 }"#).expect("write");
    let out = tmp.path().join("out");
    let report = tmp.path().join("run.json");

    bin()
        .args(["--synthetic", "5", "--config"])
        .arg(&config)
        .arg("--output-dir")
        .arg(&out)
        .arg("--json-report")
        .arg(&report)
        .assert()
        .success();

    assert_eq!(png_files(&out).len(), 2);
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(summary["stop"], "frame_limit");
}

#[test]
fn headless_build_requires_output_dir() {
    bin()
        .args(["--synthetic", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available in this build"));
}
