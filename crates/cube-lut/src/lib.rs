//! cube-lut: 3D color lookup tables for 8-bit RGB images
//!
//! This crate parses the text `.cube` 3D LUT format and applies it to
//! interleaved RGB8 buffers with trilinear interpolation.
//!
//! # Quick Start
//!
//! ```
//! use cube_lut::{LutTable, PixelBuffer, PixelTransformer};
//!
//! let table = LutTable::identity(17).unwrap();
//! let mut buffer = PixelBuffer::from_pixels(2, 1, &[[10, 20, 30], [200, 150, 100]]).unwrap();
//!
//! let transformer = PixelTransformer::new();
//! transformer.apply(&mut buffer, &table);
//!
//! assert_eq!(buffer.pixel(1, 0), Some([200, 150, 100]));
//! ```
//!
//! # Lattice Layout
//!
//! A table of size `N` holds `N³` samples with red varying fastest:
//!
//! ```text
//! index(r, g, b) = r + g * N + b * N * N
//! ```
//!
//! # Interpolation
//!
//! [`LutTable::apply`] maps each channel onto the lattice (`c * (N - 1)`),
//! clamps the lower cell corner to `[0, N - 2]` and interpolates the eight
//! surrounding samples along red, then green, then blue. The weight is not
//! clamped, so inputs outside `[0, 1]` extrapolate from the edge cell;
//! [`round_to_byte`] saturates the result when converting back to bytes.

mod error;
mod parse;
mod pixel;
mod table;
mod transform;


pub use error::{BufferError, LutError};
pub use pixel::{PixelBuffer, CHANNELS};
pub use table::{LutTable, Rgb, MAX_LATTICE_SIZE};
pub use transform::{round_to_byte, PixelTransformer};
