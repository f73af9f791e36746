//! SVG serialisation of module grids.

use crate::error::PatternError;
use crate::grid::{MODULE_COUNT, ModuleGrid};

/// Pixel size used when the caller does not choose one.
pub const DEFAULT_SIZE: u32 = 200;

// One pixel per module.
const MIN_SIZE: u32 = 21;
const _: () = assert!(MIN_SIZE as usize == MODULE_COUNT);

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A rendered identifier pattern.
///
/// The markup is a square `size × size` SVG document: a white background
/// followed by one black square per dark module. Modules are
/// `size / 21` pixels wide (rounded down) and anchored at the origin, so
/// sizes that are not a multiple of 21 leave a white strip along the right
/// and bottom edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    identifier: String,
    size: u32,
    module_size: u32,
    grid: ModuleGrid,
    svg: String,
}

impl RenderedImage {
    /// Identifier the pattern was rendered from.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Width and height of the image in pixels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Width and height of a single module in pixels.
    #[must_use]
    pub const fn module_size(&self) -> u32 {
        self.module_size
    }

    /// Module grid backing the image.
    #[must_use]
    pub const fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// SVG markup suitable for inline embedding or export.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Consume the image and return its markup.
    #[must_use]
    pub fn into_svg(self) -> String {
        self.svg
    }
}

/// Render the pattern for `identifier` at `size × size` pixels.
///
/// Rendering is pure: the same inputs always yield byte-identical markup.
///
/// # Errors
///
/// Returns [`PatternError::SizeTooSmall`] when `size` is below 21 pixels,
/// which would give modules zero pixels wide.
///
/// # Example
///
/// ```
/// use cps_pattern::render;
///
/// let image = render("CPS00000000", 210).expect("size is large enough");
/// assert_eq!(image.module_size(), 10);
/// assert!(image.svg().contains(r#"width="210" height="210""#));
///
/// assert!(render("CPS00000000", 20).is_err());
/// ```
pub fn render(identifier: &str, size: u32) -> Result<RenderedImage, PatternError> {
    if size < MIN_SIZE {
        return Err(PatternError::SizeTooSmall {
            size,
            minimum: MIN_SIZE,
        });
    }
    let module_size = size.div_euclid(MIN_SIZE);
    let grid = ModuleGrid::for_identifier(identifier);
    let svg = serialise(&grid, size, module_size);
    Ok(RenderedImage {
        identifier: identifier.to_owned(),
        size,
        module_size,
        grid,
        svg,
    })
}

/// Render the pattern for `identifier` at [`DEFAULT_SIZE`].
///
/// # Errors
///
/// Never fails in practice; the result mirrors [`render`] for uniformity.
pub fn render_default(identifier: &str) -> Result<RenderedImage, PatternError> {
    render(identifier, DEFAULT_SIZE)
}

fn serialise(grid: &ModuleGrid, size: u32, module_size: u32) -> String {
    let mut svg = format!(
        r#"<svg xmlns="{SVG_NAMESPACE}" viewBox="0 0 {size} {size}" width="{size}" height="{size}">"#
    );
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    for (row, col) in grid.dark_modules() {
        let x = col as u64 * u64::from(module_size);
        let y = row as u64 * u64::from(module_size);
        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{module_size}" height="{module_size}" fill="black"/>"#
        ));
    }
    svg.push_str("</svg>");
    svg
}
