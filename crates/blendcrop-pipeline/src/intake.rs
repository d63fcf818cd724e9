//! File intake checks.
//!
//! Uploads are accepted only when the file name carries an image
//! extension *and* the bytes start with a PNG or JPEG signature.
//! Rejected files never reach the decoder and never change session
//! state.

use image::ImageFormat;

use crate::types::PipelineError;

/// Accepted file extensions (case-insensitive).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Value for an `<input type="file" accept=...>` attribute.
pub const ACCEPT_ATTRIBUTE: &str = ".png,.jpg,.jpeg,image/png,image/jpeg";

/// Check whether a filename has an allowed image extension.
#[must_use]
pub fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Validate an uploaded file and return its detected format.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::InvalidFileType`] if the name has no
/// accepted extension or the content is not PNG or JPEG.
pub fn check(file_name: &str, bytes: &[u8]) -> Result<ImageFormat, PipelineError> {
    if !has_allowed_extension(file_name) {
        log::warn!("rejected upload {file_name:?}: unsupported extension");
        return Err(PipelineError::InvalidFileType(file_name.to_string()));
    }
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        _ => {
            log::warn!("rejected upload {file_name:?}: content is not PNG or JPEG");
            Err(PipelineError::InvalidFileType(file_name.to_string()))
        }
    }
}

/// A file that passed [`check`], with the format its content sniffed as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    /// Original file name.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Detected format (PNG or JPEG).
    pub format: ImageFormat,
}

impl AcceptedUpload {
    /// MIME type of the content, for displaying the original file.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Run [`check`] and keep the file together with its detected format.
///
/// # Errors
///
/// Same as [`check`].
pub fn accept(name: String, bytes: Vec<u8>) -> Result<AcceptedUpload, PipelineError> {
    let format = check(&name, &bytes)?;
    Ok(AcceptedUpload {
        name,
        bytes,
        format,
    })
}
