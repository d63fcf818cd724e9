//! blendcrop-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, Blob URLs and downloads, and provides the UI
//! components for the blendcrop web application. All pixel work is
//! delegated to `blendcrop-pipeline`.

pub mod components;
pub mod download;
pub mod raster;

pub use components::{BlendControls, CropEditor, ExportPanel, FileUpload, ImageSlot, Preview};
