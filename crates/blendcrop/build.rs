// Build scripts signal errors by panicking; there is no caller to
// return Result to.  Cargo treats a non-zero exit as a build failure.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Build script for the blendcrop binary crate.
//!
//! ## Tailwind CSS compilation
//!
//! Runs `npx @tailwindcss/cli` to compile `crates/blendcrop/tailwind.css`
//! into `$OUT_DIR/assets/tailwind.css`, so every `cargo` invocation
//! (clippy, test, coverage, etc.) can compile without relying on
//! `dx build` having run first.  When Node.js is not installed the
//! stylesheet is left empty and a cargo warning is printed; the app
//! still builds and runs, unstyled.
//!
//! ## Theme assets
//!
//! Copies `assets/theme.css` into `OUT_DIR` so that `main.rs` can
//! `include_str!` it via a stable environment variable path.
//!
//! ## Generated `index.html`
//!
//! Generates `index.html` at the crate root for the Dioxus CLI.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    // Workspace root is two levels up from crates/blendcrop/.
    let workspace_root = manifest_dir
        .parent()
        .and_then(Path::parent)
        .expect("could not find workspace root");

    build_tailwind_css(&manifest_dir, workspace_root, &out_dir);
    copy_theme_css(&manifest_dir, &out_dir);
    generate_index_html(&manifest_dir);
}

/// Compile Tailwind CSS via `npx @tailwindcss/cli`.
///
/// Input:  `crates/blendcrop/tailwind.css`
/// Output: `$OUT_DIR/assets/tailwind.css`
///
/// The output path is exposed as `TAILWIND_CSS_PATH` for
/// `include_str!(env!("TAILWIND_CSS_PATH"))` in `main.rs`.
fn build_tailwind_css(manifest_dir: &Path, workspace_root: &Path, out_dir: &Path) {
    let input = manifest_dir.join("tailwind.css");
    let assets_dir = out_dir.join("assets");
    let output = assets_dir.join("tailwind.css");

    fs::create_dir_all(&assets_dir)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", assets_dir.display()));

    println!("cargo:rerun-if-changed={}", input.display());

    // Tailwind scans the UI crates for utility class names; the
    // pipeline and CLI crates contain none.
    let crates_dir = workspace_root.join("crates");
    register_rs_sources(&crates_dir.join("blendcrop"));
    register_rs_sources(&crates_dir.join("blendcrop-io"));

    let input_lossy = input.to_string_lossy();
    let output_lossy = output.to_string_lossy();
    let mut args: Vec<&str> = vec!["@tailwindcss/cli", "-i", &input_lossy, "-o", &output_lossy];

    let profile = env::var("PROFILE").unwrap_or_default();
    if profile == "release" {
        args.push("--minify");
    }

    let compiled = match Command::new("npx").args(&args).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            println!("cargo:warning=`npx @tailwindcss/cli` exited with {status}; using empty CSS");
            false
        }
        Err(e) => {
            println!("cargo:warning=failed to run `npx @tailwindcss/cli` ({e}); using empty CSS");
            false
        }
    };
    if !compiled {
        fs::write(&output, "")
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", output.display()));
    }

    println!("cargo:rustc-env=TAILWIND_CSS_PATH={}", output.display());
}

/// Recursively emit `cargo:rerun-if-changed` for every `.rs` file
/// under `dir`.
fn register_rs_sources(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            register_rs_sources(&path);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}

/// Copy the theme stylesheet into `OUT_DIR` as `THEME_CSS_PATH`.
fn copy_theme_css(manifest_dir: &Path, out_dir: &Path) {
    let src = manifest_dir.join("assets/theme.css");
    let dst = out_dir.join("theme.css");

    println!("cargo:rerun-if-changed={}", src.display());
    fs::copy(&src, &dst)
        .unwrap_or_else(|e| panic!("failed to copy {} to {}: {e}", src.display(), dst.display()));
    println!("cargo:rustc-env=THEME_CSS_PATH={}", dst.display());
}

/// Generate `crates/blendcrop/index.html`.
///
/// Note: this writes to `manifest_dir` (the source tree) rather than
/// `OUT_DIR` because Dioxus CLI expects `index.html` at the crate
/// root for serving.  The file is gitignored.
fn generate_index_html(manifest_dir: &Path) {
    let index_html = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>{app_title}</title>
    <meta content="text/html;charset=utf-8" http-equiv="Content-Type" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta charset="UTF-8" />
  </head>
  <body>
    <div id="main"></div>
  </body>
</html>
"#;

    let index_path = manifest_dir.join("index.html");
    let unchanged = fs::read_to_string(&index_path).is_ok_and(|existing| existing == index_html);
    if !unchanged {
        fs::write(&index_path, index_html)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", index_path.display()));
    }
}
