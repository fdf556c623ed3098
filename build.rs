//! Build script for detecting system dependencies and providing installation guidance.
//!
//! Checks for OpenCV and pkg-config, which the capture backend links against,
//! and prints hints when they are missing.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    check_pkg_config();
    check_opencv();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Camera capture needs the videoio module.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev clang libclang-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_pkg_config() {
    let found = Command::new("pkg-config")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    if !found {
        println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
        println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
        println!("cargo:warning=On macOS: brew install pkg-config");
    }
}
