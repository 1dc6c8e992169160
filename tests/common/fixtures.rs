//! Test fixtures: LUT text and JPEG files.

use cube_lut::PixelBuffer;
use lutwatch::codec::jpeg;

/// Bytes stored in the EXIF segment of [`jpeg_with_exif`]
pub const EXIF_PAYLOAD: &[u8] = b"MM\0*\0\0\0\x08lutwatch-test-camera";

/// `.cube` text for an identity table of the given lattice size
pub fn identity_cube(size: usize) -> String {
    let max = (size - 1) as f32;
    cube_from_fn(size, |r, g, b| [r as f32 / max, g as f32 / max, b as f32 / max])
}

/// `.cube` text for a table mapping every input to `rgb`
pub fn constant_cube(size: usize, rgb: [f32; 3]) -> String {
    cube_from_fn(size, |_, _, _| rgb)
}

/// `.cube` text with `size³` rows produced by `sample`, red varying fastest
pub fn cube_from_fn(size: usize, sample: impl Fn(usize, usize, usize) -> [f32; 3]) -> String {
    let mut text = String::from("# generated for tests\nTITLE \"fixture\"\n");
    text.push_str(&format!("LUT_3D_SIZE {size}\n\n"));
    for b in 0..size {
        for g in 0..size {
            for r in 0..size {
                let [cr, cg, cb] = sample(r, g, b);
                text.push_str(&format!("{cr:.6} {cg:.6} {cb:.6}\n"));
            }
        }
    }
    text
}

/// A `LUT_3D_SIZE 4` table missing its last row
pub fn truncated_cube() -> String {
    let full = identity_cube(4);
    let mut lines: Vec<&str> = full.lines().collect();
    lines.pop();
    lines.join("\n")
}

/// A solid-color image
pub fn solid(width: u32, height: u32, color: [u8; 3]) -> PixelBuffer {
    let pixels = vec![color; (width * height) as usize];
    PixelBuffer::from_pixels(width, height, &pixels).unwrap()
}

/// Encode a solid-color JPEG without any metadata
pub fn plain_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    jpeg::encode(&solid(width, height, color), 95).unwrap()
}

/// Encode a solid-color JPEG carrying an EXIF segment with [`EXIF_PAYLOAD`]
pub fn jpeg_with_exif(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let plain = plain_jpeg(width, height, color);

    let mut data = Vec::with_capacity(plain.len() + 64);
    data.extend_from_slice(&plain[..2]);
    data.extend_from_slice(&exif_segment(EXIF_PAYLOAD));
    data.extend_from_slice(&plain[2..]);
    data
}

/// An APP1 segment holding `Exif\0\0` followed by `payload`
pub fn exif_segment(payload: &[u8]) -> Vec<u8> {
    let body_len = 2 + 6 + payload.len();
    let mut segment = vec![0xFF, 0xE1, (body_len >> 8) as u8, body_len as u8];
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(payload);
    segment
}
