//! Identifier card shown to a signed-in student.
//!
//! The card renders the CPS pattern once for its identifier and size and
//! offers copy, share and export actions over driven ports.

use camino::{Utf8Path, Utf8PathBuf};
use cps_pattern::{PatternError, RenderedImage, export_svg, render};
use tracing::{debug, info};

use super::ports::{Clipboard, ClipboardError, ShareError, SharePayload, ShareTarget};

const SHARE_TITLE: &str = "My Chakula Poa CPS Number";

/// Result of a share attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The platform accepted the payload.
    Shared,
    /// Sharing was unavailable, cancelled or failed; nothing happened.
    Skipped,
}

/// Copy the raw identifier text to the clipboard.
///
/// # Errors
///
/// Returns the clipboard's error unchanged.
pub async fn copy_identifier(
    clipboard: &dyn Clipboard,
    identifier: &str,
) -> Result<(), ClipboardError> {
    clipboard.write_text(identifier).await
}

/// Offer the identifier to the platform share action.
///
/// Every share error is logged and reported as [`ShareOutcome::Skipped`].
pub async fn share_identifier(target: &dyn ShareTarget, identifier: &str) -> ShareOutcome {
    let payload = share_payload(identifier);
    match target.share(&payload).await {
        Ok(()) => {
            info!("identifier shared");
            ShareOutcome::Shared
        }
        Err(err) => {
            let kind = err.kind();
            match err {
                ShareError::Unsupported | ShareError::Cancelled => {
                    debug!(kind, "identifier share skipped");
                }
                ShareError::Failed { message } => {
                    info!(kind, %message, "identifier share failed");
                }
            }
            ShareOutcome::Skipped
        }
    }
}

/// Payload offered when sharing an identifier.
pub fn share_payload(identifier: &str) -> SharePayload {
    SharePayload {
        title: SHARE_TITLE.to_owned(),
        text: format!("My CPS Number: {identifier}"),
    }
}

/// A rendered identifier card.
///
/// # Examples
/// ```
/// use chakula_client::domain::IdentifierCard;
///
/// let card = IdentifierCard::new("CPS00000000", 210).unwrap();
/// assert_eq!(card.identifier(), "CPS00000000");
/// assert!(card.svg().ends_with("</svg>"));
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierCard {
    image: RenderedImage,
}

impl IdentifierCard {
    /// Render the card for `identifier` at `size` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::SizeTooSmall`] when `size` cannot hold one
    /// pixel per module.
    pub fn new(identifier: &str, size: u32) -> Result<Self, PatternError> {
        Ok(Self {
            image: render(identifier, size)?,
        })
    }

    /// Identifier shown on the card.
    pub fn identifier(&self) -> &str {
        self.image.identifier()
    }

    /// SVG markup for the pattern.
    pub fn svg(&self) -> &str {
        self.image.svg()
    }

    /// Rendered image backing the card.
    pub fn image(&self) -> &RenderedImage {
        &self.image
    }

    /// Write the pattern as an SVG file into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the directory cannot be opened or
    /// written.
    pub fn export_to(&self, dir: &Utf8Path) -> Result<Utf8PathBuf, PatternError> {
        let path = export_svg(dir, &self.image)?;
        info!(%path, "identifier pattern exported");
        Ok(path)
    }

    /// Copy the identifier text to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns the clipboard's error unchanged.
    pub async fn copy(&self, clipboard: &dyn Clipboard) -> Result<(), ClipboardError> {
        copy_identifier(clipboard, self.identifier()).await
    }

    /// Offer the identifier to the platform share action.
    pub async fn share(&self, target: &dyn ShareTarget) -> ShareOutcome {
        share_identifier(target, self.identifier()).await
    }
}
