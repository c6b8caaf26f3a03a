// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn renders_an_image_of_the_requested_size() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("brot.png");
    Command::cargo_bin("brot")
        .unwrap()
        .args(&["--output", output.to_str().unwrap()])
        .args(&["--size", "64x48", "--iterations", "60", "--step", "25"])
        .args(&["--center=-0.5,0", "--palette", "gray-scale"])
        .assert()
        .success();

    let rendered = image::open(&output).unwrap();
    assert_eq!(rendered.dimensions(), (64, 48));
}

#[test]
fn unknown_names_fall_back_instead_of_failing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("fallback.png");
    Command::cargo_bin("brot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-s", "16x16", "-i", "10"])
        .args(&["--function", "no-such-rule", "--palette", "paisley"])
        .args(&["--color-function", "wiggly"])
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn every_option_is_accepted() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("everything.png");
    Command::cargo_bin("brot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-s", "24x20", "-i", "30"])
        .args(&["--function", "celtic-heart", "--power", "3,0"])
        .args(&["--escape-radius", "4", "--range", "1.5"])
        .args(&["--z-offset=0.1,-0.1", "--color-function", "tanh", "-n", "2"])
        .args(&["--smoothing-iterations", "3", "--period", "2", "--offset", "0.25"])
        .args(&["--no-sine", "--probe=-0.2,0.1"])
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn a_malformed_size_is_rejected() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("never.png");
    Command::cargo_bin("brot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-s", "sixty-by-forty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
    assert!(!output.exists());
}

#[test]
fn a_zero_iteration_count_is_rejected() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("never.png");
    Command::cargo_bin("brot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-i", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Iteration count must be"));
}

#[test]
fn output_is_required() {
    Command::cargo_bin("brot")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}
