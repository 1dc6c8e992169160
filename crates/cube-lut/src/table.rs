//! The 3D lattice and its trilinear lookup.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LutError;
use crate::parse::parse_cube;

/// Largest lattice size accepted from a `.cube` resource.
pub const MAX_LATTICE_SIZE: usize = 256;

/// A normalized RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Component-wise `self + t * (other - self)`.
    #[inline]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }
}

#[inline]
fn lerp(v0: f32, v1: f32, t: f32) -> f32 {
    v0 + t * (v1 - v0)
}

/// A 3D color lookup table.
///
/// Samples are stored red-fastest, then green, then blue, so the sample for
/// lattice coordinate `(r, g, b)` lives at `r + g * N + b * N * N`.
///
/// A table is either empty (every lookup is the identity) or complete: the
/// only constructors that produce a non-empty table check that
/// `samples.len() == N³` and `N >= 2` before returning it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LutTable {
    size: usize,
    samples: Vec<Rgb>,
}

impl LutTable {
    /// An unloaded table. [`LutTable::apply`] passes values through unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a `.cube` resource from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LutError> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    /// Parse a `.cube` resource from any buffered reader.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, LutError> {
        parse_cube(reader)
    }

    /// Build a table from samples already in red-fastest order.
    pub fn from_samples(size: usize, samples: Vec<Rgb>) -> Result<Self, LutError> {
        if size < 2 {
            return Err(LutError::malformed(format!(
                "lattice size must be at least 2, got {}",
                size
            )));
        }
        if size > MAX_LATTICE_SIZE {
            return Err(LutError::malformed(format!(
                "lattice size {} exceeds maximum of {}",
                size, MAX_LATTICE_SIZE
            )));
        }
        let expected = size * size * size;
        if samples.len() != expected {
            return Err(LutError::malformed(format!(
                "expected {} samples for lattice size {}, found {}",
                expected,
                size,
                samples.len()
            )));
        }
        Ok(Self { size, samples })
    }

    /// A table whose sample at `(i, j, k)` is `(i, j, k) / (N - 1)`.
    pub fn identity(size: usize) -> Result<Self, LutError> {
        let max = size.saturating_sub(1).max(1) as f32;
        let mut samples = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    samples.push(Rgb::new(r as f32 / max, g as f32 / max, b as f32 / max));
                }
            }
        }
        Self::from_samples(size, samples)
    }

    /// Lattice points per axis, 0 when unloaded.
    pub fn lattice_size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.size >= 2 && self.samples.len() == self.size * self.size * self.size
    }

    /// Stored sample at lattice coordinate `(r, g, b)`.
    pub fn sample(&self, r: usize, g: usize, b: usize) -> Option<Rgb> {
        if r >= self.size || g >= self.size || b >= self.size {
            return None;
        }
        self.samples.get(self.index(r, g, b)).copied()
    }

    #[inline]
    fn index(&self, r: usize, g: usize, b: usize) -> usize {
        r + g * self.size + b * self.size * self.size
    }

    /// Lower corner of the interpolation cell, kept in `[0, N - 2]` so the
    /// upper corner always exists.
    #[inline]
    fn base_index(&self, mapped: f32) -> usize {
        let max = (self.size - 2) as f32;
        mapped.floor().clamp(0.0, max) as usize
    }

    /// Trilinear lookup of a normalized RGB value.
    ///
    /// Inputs are not clamped. Outside `[0, 1]` the cell index is clamped but
    /// the weight is not, which extrapolates linearly past the edge samples.
    /// Interpolation collapses the eight corners along red, then green, then
    /// blue; changing that order changes the low bits of the result.
    pub fn apply(&self, r: f32, g: f32, b: f32) -> Rgb {
        if self.size == 0 {
            return Rgb::new(r, g, b);
        }

        let scale = (self.size - 1) as f32;
        let (mr, mg, mb) = (r * scale, g * scale, b * scale);

        let ir = self.base_index(mr);
        let ig = self.base_index(mg);
        let ib = self.base_index(mb);

        let dr = mr - ir as f32;
        let dg = mg - ig as f32;
        let db = mb - ib as f32;

        let at = |r: usize, g: usize, b: usize| self.samples[self.index(r, g, b)];

        let c000 = at(ir, ig, ib);
        let c100 = at(ir + 1, ig, ib);
        let c010 = at(ir, ig + 1, ib);
        let c110 = at(ir + 1, ig + 1, ib);
        let c001 = at(ir, ig, ib + 1);
        let c101 = at(ir + 1, ig, ib + 1);
        let c011 = at(ir, ig + 1, ib + 1);
        let c111 = at(ir + 1, ig + 1, ib + 1);

        // red: 8 -> 4
        let c00 = c000.lerp(c100, dr);
        let c10 = c010.lerp(c110, dr);
        let c01 = c001.lerp(c101, dr);
        let c11 = c011.lerp(c111, dr);

        // green: 4 -> 2
        let c0 = c00.lerp(c10, dg);
        let c1 = c01.lerp(c11, dg);

        // blue: 2 -> 1
        c0.lerp(c1, db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_is_identity() {
        let table = LutTable::empty();
        assert!(!table.is_valid());
        assert_eq!(table.lattice_size(), 0);
        assert_eq!(table.apply(0.25, 1.5, -0.5), Rgb::new(0.25, 1.5, -0.5));
    }

    #[test]
    fn test_from_samples_rejects_wrong_length() {
        let result = LutTable::from_samples(2, vec![Rgb::default(); 7]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_samples_rejects_size_one() {
        let result = LutTable::from_samples(1, vec![Rgb::default()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_samples_rejects_oversized_lattice() {
        let result = LutTable::from_samples(MAX_LATTICE_SIZE + 1, Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_index_is_red_fastest() {
        // Encode the lattice coordinate into the sample so the layout is visible
        let size = 3;
        let mut samples = Vec::new();
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    samples.push(Rgb::new(r as f32, g as f32, b as f32));
                }
            }
        }
        let table = LutTable::from_samples(size, samples).unwrap();

        assert_eq!(table.sample(1, 0, 0), Some(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!(table.sample(0, 2, 1), Some(Rgb::new(0.0, 2.0, 1.0)));
        assert_eq!(table.sample(3, 0, 0), None);
        assert_eq!(table.samples[1], Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(table.samples[size], Rgb::new(0.0, 1.0, 0.0));
        assert_eq!(table.samples[size * size], Rgb::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_midpoint_of_two_point_lattice() {
        let table = LutTable::identity(2).unwrap();
        let out = table.apply(0.5, 0.5, 0.5);
        assert_eq!(out, Rgb::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_extrapolates_past_edges() {
        // size 2 identity: the weight is the input itself, unclamped
        let table = LutTable::identity(2).unwrap();
        let out = table.apply(1.5, -0.25, 2.0);
        assert_eq!(out, Rgb::new(1.5, -0.25, 2.0));
    }

    #[test]
    fn test_nan_input_does_not_panic() {
        let table = LutTable::identity(5).unwrap();
        let out = table.apply(f32::NAN, 0.5, 0.5);
        assert!(out.r.is_nan());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(0.0, 0.25, 1.0);
        let b = Rgb::new(1.0, 0.75, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(0.5, 0.5, 0.5));
    }
}
