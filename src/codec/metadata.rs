//! Metadata transfer between JPEG files.
//!
//! Works directly on the marker segments that precede the scan data:
//! APP1 segments holding EXIF or XMP and APP13 segments holding IPTC
//! (Photoshop IRB) are lifted out of the source and spliced into the
//! destination, replacing whatever the destination carried of those kinds.
//! Pixel data is never touched.

use std::path::Path;

use super::MetadataTransfer;
use crate::error::MetadataError;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const APP13: u8 = 0xED;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const XMP_EXTENSION_HEADER: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
const IPTC_HEADER: &[u8] = b"Photoshop 3.0\0";

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegMetadataCopier;

impl JpegMetadataCopier {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataTransfer for JpegMetadataCopier {
    fn copy(&self, source: &Path, dest: &Path) -> Result<(), MetadataError> {
        let source_data = std::fs::read(source)?;
        let dest_data = std::fs::read(dest)?;

        match transfer(&source_data, source, &dest_data, dest)? {
            Some(rewritten) => {
                std::fs::write(dest, rewritten)?;
                tracing::debug!(
                    source = %source.display(),
                    dest = %dest.display(),
                    "Metadata segments copied"
                );
            }
            None => {
                tracing::debug!(source = %source.display(), "Source carries no metadata segments");
            }
        }
        Ok(())
    }
}

/// One header segment, marker bytes included
#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    marker: u8,
    bytes: &'a [u8],
}

impl Segment<'_> {
    fn payload(&self) -> &[u8] {
        self.bytes.get(4..).unwrap_or(&[])
    }

    fn is_metadata(&self) -> bool {
        let payload = self.payload();
        match self.marker {
            APP1 => {
                payload.starts_with(EXIF_HEADER)
                    || payload.starts_with(XMP_HEADER)
                    || payload.starts_with(XMP_EXTENSION_HEADER)
            }
            APP13 => payload.starts_with(IPTC_HEADER),
            _ => false,
        }
    }
}

/// Splits the header of a JPEG into segments. Returns them together with the
/// offset of the first byte that is not part of the header (normally SOS).
fn header_segments<'a>(
    data: &'a [u8],
    path: &Path,
) -> Result<(Vec<Segment<'a>>, usize), MetadataError> {
    if !data.starts_with(&SOI) {
        return Err(MetadataError::NotJpeg(path.to_path_buf()));
    }
    let truncated = || MetadataError::Truncated(path.to_path_buf());

    let mut segments = Vec::new();
    let mut pos = SOI.len();

    loop {
        if data.get(pos) != Some(&0xFF) {
            return Err(truncated());
        }
        let marker = *data.get(pos + 1).ok_or_else(truncated)?;

        match marker {
            // fill byte before the real marker
            0xFF => {
                pos += 1;
                continue;
            }
            SOS | EOI => return Ok((segments, pos)),
            0x01 | 0xD0..=0xD7 => {
                segments.push(Segment {
                    marker,
                    bytes: &data[pos..pos + 2],
                });
                pos += 2;
                continue;
            }
            _ => {}
        }

        let length = data.get(pos + 2..pos + 4).ok_or_else(truncated)?;
        let length = u16::from_be_bytes([length[0], length[1]]) as usize;
        if length < 2 {
            return Err(truncated());
        }
        let end = pos + 2 + length;
        if end > data.len() {
            return Err(truncated());
        }
        segments.push(Segment {
            marker,
            bytes: &data[pos..end],
        });
        pos = end;
    }
}

/// Build a copy of `dest` carrying the metadata segments of `source`.
///
/// Returns `None` when the source has nothing to transfer, in which case the
/// destination is left as it is.
fn transfer(
    source: &[u8],
    source_path: &Path,
    dest: &[u8],
    dest_path: &Path,
) -> Result<Option<Vec<u8>>, MetadataError> {
    let (source_segments, _) = header_segments(source, source_path)?;
    let carried: Vec<Segment<'_>> = source_segments
        .into_iter()
        .filter(|s| s.is_metadata())
        .collect();
    if carried.is_empty() {
        return Ok(None);
    }

    let (dest_segments, body_start) = header_segments(dest, dest_path)?;
    let carried_len: usize = carried.iter().map(|s| s.bytes.len()).sum();

    let mut out = Vec::with_capacity(dest.len() + carried_len);
    out.extend_from_slice(&SOI);

    // JFIF/JFXX headers stay first, metadata follows them
    let leading_app0 = dest_segments
        .iter()
        .take_while(|s| s.marker == APP0)
        .count();
    for segment in &dest_segments[..leading_app0] {
        out.extend_from_slice(segment.bytes);
    }
    for segment in &carried {
        out.extend_from_slice(segment.bytes);
    }
    for segment in &dest_segments[leading_app0..] {
        if !segment.is_metadata() {
            out.extend_from_slice(segment.bytes);
        }
    }
    out.extend_from_slice(&dest[body_start..]);

    Ok(Some(out))
}
