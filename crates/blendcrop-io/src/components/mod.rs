//! Dioxus UI components for blendcrop.
//!
//! Provides the per-layer upload and crop panels, the blend parameter
//! controls, the composite preview, and the export panel.

mod blend_controls;
mod controls;
mod crop_editor;
mod export;
mod image_slot;
mod preview;
mod upload;

pub use blend_controls::BlendControls;
pub use crop_editor::CropEditor;
pub use export::ExportPanel;
pub use image_slot::ImageSlot;
pub use preview::Preview;
pub use upload::FileUpload;
