//! Host page seam and display-URL ownership for the design on screen.
//!
//! DESIGN
//! ======
//! A display URL is an allocated host resource (a blob URL in the browser).
//! [`DisplayUrl`] owns exactly one and revokes it on drop, so replacing the
//! shown design, clearing it, a decode failure, and engine teardown all
//! release the previous URL without any explicit bookkeeping at call sites.

#[cfg(test)]
#[path = "display_test.rs"]
mod display_test;

use std::io::Cursor;
use std::rc::Rc;

use crate::error::ErrorCode;
use crate::overlay::geometry::{Size, Viewport};
use crate::services::images::StoredImage;

/// Everything the engine needs from the page it overlays.
pub trait HostPage {
    /// Current scroll offset and window size.
    fn viewport(&self) -> Viewport;

    /// Full scrollable size of the document.
    fn document_size(&self) -> Size;

    /// Allocate a URL the page can render `content` from.
    fn create_object_url(&self, content: &[u8], mime_type: &str) -> String;

    /// Release a URL returned by [`HostPage::create_object_url`].
    fn revoke_object_url(&self, url: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("design {id} could not be decoded: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },
}

impl ErrorCode for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "E_DESIGN_DECODE",
        }
    }
}

/// Owned display URL, revoked when dropped.
pub struct DisplayUrl<H: HostPage> {
    url: String,
    host: Rc<H>,
}

impl<H: HostPage> DisplayUrl<H> {
    pub fn acquire(host: &Rc<H>, image: &StoredImage) -> Self {
        let url = host.create_object_url(&image.content, &image.mime_type);
        tracing::debug!(image_id = %image.id, %url, "display url allocated");
        Self { url, host: Rc::clone(host) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl<H: HostPage> Drop for DisplayUrl<H> {
    fn drop(&mut self) {
        self.host.revoke_object_url(&self.url);
        tracing::debug!(url = %self.url, "display url released");
    }
}

impl<H: HostPage> std::fmt::Debug for DisplayUrl<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DisplayUrl").field(&self.url).finish()
    }
}

/// A design that is allocated and decoded, ready to draw.
pub struct LoadedDesign<H: HostPage> {
    pub image_id: String,
    pub natural_size: Size,
    url: DisplayUrl<H>,
}

impl<H: HostPage> std::fmt::Debug for LoadedDesign<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedDesign")
            .field("image_id", &self.image_id)
            .field("natural_size", &self.natural_size)
            .field("url", &self.url)
            .finish()
    }
}

impl<H: HostPage> LoadedDesign<H> {
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

/// Allocate a display URL for `image` and read its intrinsic size.
///
/// # Errors
///
/// Returns [`DisplayError::Decode`] if the bytes are not a readable image.
/// The URL allocated for it has been released by then.
pub fn load_design<H: HostPage>(host: &Rc<H>, image: &StoredImage) -> Result<LoadedDesign<H>, DisplayError> {
    let url = DisplayUrl::acquire(host, image);
    let natural_size = natural_size(&image.content)
        .map_err(|source| DisplayError::Decode { id: image.id.clone(), source })?;
    Ok(LoadedDesign { image_id: image.id.clone(), natural_size, url })
}

/// Intrinsic pixel size of encoded image bytes, sniffing the format.
///
/// # Errors
///
/// Returns the decoder error for unknown or truncated content.
pub fn natural_size(content: &[u8]) -> Result<Size, image::ImageError> {
    let reader = image::ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let (width, height) = reader.into_dimensions()?;
    Ok(Size::new(f64::from(width), f64::from(height)))
}
