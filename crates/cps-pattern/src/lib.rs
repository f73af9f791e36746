//! Deterministic identifier patterns for Chakula Poa CPS numbers.
//!
//! The pattern looks like a QR code but is not one: there is no data
//! encoding, no error correction and no masking. A short identifier is
//! folded into a 32-bit seed which drives a 21×21 module grid carrying three
//! corner finder markers. The grid is then serialised to SVG so it can be
//! embedded in a page or exported as a standalone file.
//!
//! # Overview
//!
//! - [`seed_hash`] folds an identifier into its signed 32-bit seed.
//! - [`ModuleGrid`] holds the computed dark/light modules.
//! - [`render`] produces a [`RenderedImage`] for a pixel size.
//! - [`export_svg`] writes the image atomically into a directory.
//!
//! # Example
//!
//! ```
//! use cps_pattern::{DEFAULT_SIZE, ModuleGrid, render};
//!
//! let image = render("CPS00000000", DEFAULT_SIZE).expect("default size renders");
//! assert!(image.svg().starts_with("<svg"));
//!
//! let grid = ModuleGrid::for_identifier("CPS00000000");
//! assert_eq!(grid.is_dark(0, 0), Some(true));
//! ```

mod atomic_io;
mod error;
mod export;
mod grid;
mod seed;
mod svg;

pub use error::PatternError;
pub use export::{export_file_name, export_svg};
pub use grid::{FINDER_SIZE, MODULE_COUNT, ModuleGrid};
pub use seed::seed_hash;
pub use svg::{DEFAULT_SIZE, RenderedImage, render, render_default};
