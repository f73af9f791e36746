//! Standalone file export for rendered patterns.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};

use crate::atomic_io::write_atomic;
use crate::error::PatternError;
use crate::svg::RenderedImage;

const FILE_PREFIX: &str = "chakula-poa-qr-";
const FILE_EXTENSION: &str = "svg";
const UNNAMED: &str = "unnamed";

/// File name used when exporting the pattern for `identifier`.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced with `_` so the name is
/// safe on every platform.
///
/// # Example
///
/// ```
/// use cps_pattern::export_file_name;
///
/// assert_eq!(export_file_name("CPS00000000"), "chakula-poa-qr-CPS00000000.svg");
/// assert_eq!(export_file_name("CPS#12/34"), "chakula-poa-qr-CPS_12_34.svg");
/// assert_eq!(export_file_name(""), "chakula-poa-qr-unnamed.svg");
/// ```
#[must_use]
pub fn export_file_name(identifier: &str) -> Utf8PathBuf {
    let sanitised: String = identifier
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let stem = if sanitised.is_empty() {
        UNNAMED
    } else {
        sanitised.as_str()
    };
    Utf8PathBuf::from(format!("{FILE_PREFIX}{stem}.{FILE_EXTENSION}"))
}

/// Export `image` as an SVG file inside `dir`.
///
/// Returns the path of the written file. An existing export for the same
/// identifier is replaced atomically.
///
/// # Errors
///
/// Returns [`PatternError::OpenDirError`] when `dir` cannot be opened and
/// [`PatternError::WriteError`] when the file cannot be written.
pub fn export_svg(dir: &Utf8Path, image: &RenderedImage) -> Result<Utf8PathBuf, PatternError> {
    let handle = Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| {
        PatternError::OpenDirError {
            path: dir.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let file_name = export_file_name(image.identifier());
    write_atomic(&handle, &file_name, image.svg())?;
    Ok(dir.join(file_name))
}
