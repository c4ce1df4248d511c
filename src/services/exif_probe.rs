//! Best-effort pixel dimension extraction for selected upload files.
//!
//! The JPEG APP1/EXIF segment is scanned for the width and height tags, and
//! the bytes are additionally run through the `image` decoder, which wins
//! when it succeeds. Every failure mode collapses to `None`; this is an
//! enrichment step, never a required one.

use serde::Serialize;

/// Only the head of the file is scanned for metadata.
const EXIF_SCAN_LIMIT: usize = 64 * 1024;

const MARKER_SOI: u16 = 0xFFD8;
const MARKER_APP1: u16 = 0xFFE1;
const TAG_IMAGE_WIDTH: u16 = 0x0100;
const TAG_IMAGE_HEIGHT: u16 = 0x0101;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: f64,
}

pub fn probe(bytes: &[u8], media_type: &str) -> Option<ImageDimensions> {
    if !media_type.starts_with("image/") {
        return None;
    }

    let head = &bytes[..bytes.len().min(EXIF_SCAN_LIMIT)];
    let exif = scan_jpeg_exif(head);
    let decoded = image::load_from_memory(bytes)
        .ok()
        .map(|img| (img.width(), img.height()));

    let (width, height) = decoded.or(exif)?;
    if width == 0 || height == 0 {
        return None;
    }
    let aspect_ratio = ((width as f64 / height as f64) * 100.0).round() / 100.0;
    Some(ImageDimensions {
        width,
        height,
        aspect_ratio,
    })
}

fn scan_jpeg_exif(bytes: &[u8]) -> Option<(u32, u32)> {
    if read_u16_be(bytes, 0)? != MARKER_SOI {
        return None;
    }

    let mut offset = 2;
    loop {
        let marker = read_u16_be(bytes, offset)?;
        let length = read_u16_be(bytes, offset + 2)? as usize;
        if marker == MARKER_APP1 {
            return scan_app1(bytes, offset, length);
        }
        offset += 2 + length;
    }
}

fn scan_app1(bytes: &[u8], offset: usize, length: usize) -> Option<(u32, u32)> {
    if bytes.get(offset + 4..offset + 8)? != b"Exif" {
        return None;
    }

    let tiff = offset + 10;
    let little_endian = match read_u16_be(bytes, tiff)? {
        0x4949 => true,  // "II"
        0x4D4D => false, // "MM"
        _ => return None,
    };

    let mut width = None;
    let mut height = None;
    let mut entry = tiff + 8;
    let end = tiff + length.saturating_sub(10);
    while entry + 12 <= end {
        let Some(tag) = read_u16(bytes, entry, little_endian) else {
            break;
        };
        match tag {
            TAG_IMAGE_WIDTH => width = read_u32(bytes, entry + 8, little_endian),
            TAG_IMAGE_HEIGHT => height = read_u32(bytes, entry + 8, little_endian),
            _ => {}
        }
        entry += 12;
    }

    Some((width?, height?))
}

fn read_u16_be(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([raw[0], raw[1]]))
}

fn read_u16(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    let raw = [raw[0], raw[1]];
    Some(if little_endian {
        u16::from_le_bytes(raw)
    } else {
        u16::from_be_bytes(raw)
    })
}

fn read_u32(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    let raw = [raw[0], raw[1], raw[2], raw[3]];
    Some(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A truncated JPEG carrying an EXIF block with width 640, height 480 in
    /// little-endian byte order. The image decoder cannot decode it, so the
    /// metadata values must be used.
    fn exif_only_jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8]; // SOI
        bytes.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x30]); // APP1, length 48
        bytes.extend_from_slice(b"Exif\0\0");
        bytes.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00]); // "II", TIFF magic
        bytes.extend_from_slice(&[0x08, 0x00, 0x00, 0x00]); // IFD offset
        // width tag: 0x0100, type SHORT, count 1, value 640
        bytes.extend_from_slice(&[0x00, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x80, 0x02, 0x00, 0x00]);
        // height tag: 0x0101, type SHORT, count 1, value 480
        bytes.extend_from_slice(&[0x01, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xE0, 0x01, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn extracts_dimensions_from_exif_when_decode_fails() {
        let dims = probe(&exif_only_jpeg(), "image/jpeg").unwrap();
        assert_eq!(dims.width, 640);
        assert_eq!(dims.height, 480);
        assert_eq!(dims.aspect_ratio, 1.33);
    }

    #[test]
    fn big_endian_exif_is_read() {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x30]);
        bytes.extend_from_slice(b"Exif\0\0");
        bytes.extend_from_slice(&[0x4D, 0x4D, 0x00, 0x2A]); // "MM"
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x08]);
        bytes.extend_from_slice(&[0x01, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x64]); // 100
        bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x32]); // 50
        let dims = probe(&bytes, "image/jpeg").unwrap();
        assert_eq!((dims.width, dims.height), (100, 50));
        assert_eq!(dims.aspect_ratio, 2.0);
    }

    #[test]
    fn non_jpeg_bytes_yield_none() {
        assert!(probe(b"not an image at all", "image/jpeg").is_none());
        assert!(probe(&[0x00, 0x01, 0x02, 0x03], "image/png").is_none());
        assert!(probe(&[], "image/jpeg").is_none());
    }

    #[test]
    fn non_image_media_type_is_skipped() {
        assert!(probe(&exif_only_jpeg(), "text/plain").is_none());
    }

    #[test]
    fn truncated_app1_segment_is_tolerated() {
        let mut bytes = exif_only_jpeg();
        bytes.truncate(20); // cut inside the TIFF header
        assert!(probe(&bytes, "image/jpeg").is_none());
    }

    #[test]
    fn missing_exif_signature_yields_none() {
        let mut bytes = exif_only_jpeg();
        bytes[6] = b'X'; // corrupt "Exif"
        assert!(probe(&bytes, "image/jpeg").is_none());
    }
}
