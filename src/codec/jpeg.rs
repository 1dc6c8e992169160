//! Baseline JPEG decode/encode.
//!
//! Decoding accepts RGB, grayscale and CMYK sources and always produces an
//! RGB buffer. Encoding writes RGB with 4:4:4 sampling so chroma detail
//! produced by the LUT is not averaged away.

use std::io::Cursor;
use std::path::Path;

use cube_lut::PixelBuffer;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};

use super::Codec;
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl JpegCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JpegCodec {
    fn load(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let data = std::fs::read(path)?;
        decode(&data)
    }

    fn save(&self, buffer: &PixelBuffer, path: &Path, quality: u8) -> Result<(), CodecError> {
        let data = encode(buffer, quality)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Decode JPEG bytes into an RGB buffer.
pub fn decode(data: &[u8]) -> Result<PixelBuffer, CodecError> {
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    let pixels = decoder
        .decode()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| CodecError::Decode("missing JPEG info".into()))?;

    let rgb = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => gray16_to_rgb(&pixels),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let k = 1.0 - cmyk[3] as f32 / 255.0;
                let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0) as u8;
                [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
            })
            .collect(),
    };

    Ok(PixelBuffer::new(info.width as u32, info.height as u32, rgb)?)
}

/// Expand native-endian 16-bit gray samples to RGB8, keeping the high byte.
fn gray16_to_rgb(samples: &[u8]) -> Vec<u8> {
    samples
        .chunks_exact(2)
        .flat_map(|l16| {
            let value = (u16::from_ne_bytes([l16[0], l16[1]]) >> 8) as u8;
            [value, value, value]
        })
        .collect()
}

/// Encode an RGB buffer as JPEG bytes.
pub fn encode(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, CodecError> {
    let too_large = || CodecError::UnsupportedDimensions {
        width: buffer.width(),
        height: buffer.height(),
    };
    let width = u16::try_from(buffer.width()).map_err(|_| too_large())?;
    let height = u16::try_from(buffer.height()).map_err(|_| too_large())?;

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, quality);
    encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
    encoder
        .encode(buffer.as_bytes(), width, height, ColorType::Rgb)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push([(x * 255 / width) as u8, (y * 255 / height) as u8, 128]);
            }
        }
        PixelBuffer::from_pixels(width, height, &pixels).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_dimensions_and_colors() {
        let original = gradient(32, 16);
        let bytes = encode(&original, 100).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 16);

        let max_diff = original
            .as_bytes()
            .iter()
            .zip(decoded.as_bytes())
            .map(|(a, b)| (*a as i32 - *b as i32).abs())
            .max()
            .unwrap();
        assert!(max_diff <= 10, "max channel difference {max_diff}");
    }

    #[test]
    fn test_grayscale_decodes_to_rgb() {
        let luma: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let mut bytes = Vec::new();
        Encoder::new(&mut bytes, 95)
            .encode(&luma, 8, 8, ColorType::Luma)
            .unwrap();

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.as_bytes().len(), 8 * 8 * 3);
        for px in decoded.as_bytes().chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_gray16_keeps_high_byte() {
        let samples: Vec<u8> = [0x12ffu16, 0xab00, 0x00ff]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();

        assert_eq!(
            gray16_to_rgb(&samples),
            vec![0x12, 0x12, 0x12, 0xab, 0xab, 0xab, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not a jpeg").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_encode_rejects_oversized_width() {
        let buffer = PixelBuffer::new(70_000, 1, vec![0; 70_000 * 3]).unwrap();
        let err = encode(&buffer, 90).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedDimensions {
                width: 70_000,
                height: 1
            }
        ));
    }

    #[test]
    fn test_save_and_load_through_trait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let codec = JpegCodec::new();

        codec.save(&gradient(8, 8), &path, 90).unwrap();
        let loaded = codec.load(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 8));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JpegCodec::new()
            .load(&dir.path().join("missing.jpg"))
            .unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
