//! Assertion helpers for tests.

use std::path::Path;

use cube_lut::PixelBuffer;
use lutwatch::services::TEMP_SUFFIX;

/// Assert no pipeline temp file is left in `dir`
pub fn assert_no_temp_files(dir: &Path) {
    let leftovers: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(TEMP_SUFFIX))
        .collect();
    assert!(leftovers.is_empty(), "Temp files left behind: {leftovers:?}");
}

/// Assert bytes look like a complete JPEG file
pub fn assert_jpeg(bytes: &[u8]) {
    assert!(
        bytes.len() > 4 && bytes[..2] == [0xFF, 0xD8] && bytes[bytes.len() - 2..] == [0xFF, 0xD9],
        "Expected JPEG data, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

pub fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Assert every pixel is within `tolerance` of `expected` on each channel
pub fn assert_pixels_near(buffer: &PixelBuffer, expected: [u8; 3], tolerance: u8) {
    for (i, px) in buffer.as_bytes().chunks_exact(3).enumerate() {
        for c in 0..3 {
            let diff = (px[c] as i16 - expected[c] as i16).unsigned_abs();
            assert!(
                diff <= tolerance as u16,
                "Pixel {i} is {px:?}, expected {expected:?} (tolerance {tolerance})"
            );
        }
    }
}
