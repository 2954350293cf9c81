// Embedded bitmap extraction from EMF media.
//
// Excel renders option buttons as Enhanced Metafiles whose only drawing
// record is a device-independent bitmap blit. The bitmap is lifted out of the
// first EMR_STRETCHDIBITS or EMR_SETDIBITSTODEVICE record, wrapped in a BMP
// file header and decoded. It is then placed the way the record draws it: the
// source rectangle is cut out and scaled to the destination size, and the
// result is drawn at the destination offset on a transparent canvas covering
// the header bounds. A bitmap that fills the bounds at 1:1 comes back
// unchanged. Only the blit is rendered; other drawing records are ignored.

use super::RasterError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use tracing::{debug, trace};
use zerocopy::FromBytes;

/// EMR_HEADER
const EMR_HEADER: u32 = 0x0000_0001;
/// EMR_EOF
const EMR_EOF: u32 = 0x0000_000E;
/// EMR_SETDIBITSTODEVICE
const EMR_SETDIBITSTODEVICE: u32 = 0x0000_0050;
/// EMR_STRETCHDIBITS
const EMR_STRETCHDIBITS: u32 = 0x0000_0051;

/// " EMF" signature at offset 40 of the header record.
const EMF_SIGNATURE: &[u8; 4] = b" EMF";
const SIGNATURE_OFFSET: usize = 40;

/// BITMAPFILEHEADER size.
const BMP_FILE_HEADER_LEN: u32 = 14;
/// Smallest BITMAPINFOHEADER.
const MIN_BMI_LEN: u32 = 40;
/// Offset of `biHeight` inside the BITMAPINFOHEADER.
const BMI_HEIGHT_OFFSET: usize = 8;
/// Largest canvas side, in pixels.
const MAX_CANVAS_SIDE: i64 = 8192;

/// Inclusive rectangle in device units.
#[derive(Debug, Clone, Copy, FromBytes)]
#[repr(C)]
struct RectL {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

/// Common record prefix.
#[derive(Debug, Clone, Copy, FromBytes)]
#[repr(C)]
struct RecordHeader {
    record_type: u32,
    record_size: u32,
}

/// Leading fields of EMR_HEADER.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, FromBytes)]
#[repr(C)]
struct HeaderPrefix {
    record_type: u32,
    record_size: u32,
    bounds: RectL,
}

/// Leading fields shared by EMR_STRETCHDIBITS and EMR_SETDIBITSTODEVICE.
///
/// Both records place the bitmap-info and bits descriptors at the same
/// offsets; only the trailing fields differ.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, FromBytes)]
#[repr(C)]
struct DibRecordPrefix {
    record_type: u32,
    record_size: u32,
    bounds: RectL,
    x_dest: i32,
    y_dest: i32,
    x_src: i32,
    y_src: i32,
    cx_src: i32,
    cy_src: i32,
    off_bmi_src: u32,
    cb_bmi_src: u32,
    off_bits_src: u32,
    cb_bits_src: u32,
}

/// Trailing fields of EMR_STRETCHDIBITS.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, FromBytes)]
#[repr(C)]
struct StretchDibitsTail {
    usage_src: u32,
    rop: u32,
    cx_dest: i32,
    cy_dest: i32,
}

/// Where a DIB record draws its bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    x_dest: i32,
    y_dest: i32,
    x_src: i32,
    y_src: i32,
    cx_src: i32,
    cy_src: i32,
    cx_dest: i32,
    cy_dest: i32,
}

/// A DIB record turned into a BMP file.
struct DibBlit {
    bmp: Vec<u8>,
    placement: Placement,
    bottom_up: bool,
}

/// Whether `data` starts with an EMF header record.
pub fn is_emf(data: &[u8]) -> bool {
    match RecordHeader::read_from_prefix(data) {
        Ok((header, _)) => {
            header.record_type == EMR_HEADER
                && data.get(SIGNATURE_OFFSET..SIGNATURE_OFFSET + 4) == Some(EMF_SIGNATURE.as_slice())
        },
        Err(_) => false,
    }
}

/// Decode the first embedded bitmap of an EMF stream, placed as drawn.
///
/// # Errors
/// - [`RasterError::InvalidEmf`] if a record header is truncated or a record
///   size points past the end of the stream
/// - [`RasterError::NoEmbeddedBitmap`] if no DIB record decodes and places
pub fn decode_embedded_bitmap(data: &[u8]) -> Result<DynamicImage, RasterError> {
    let mut offset = 0usize;
    let mut frame: Option<RectL> = None;

    while offset < data.len() {
        let (header, _) = RecordHeader::read_from_prefix(&data[offset..])
            .map_err(|_| RasterError::InvalidEmf(format!("truncated record at offset {}", offset)))?;

        let size = header.record_size as usize;
        let end = offset
            .checked_add(size)
            .filter(|&end| size >= 8 && end <= data.len())
            .ok_or_else(|| {
                RasterError::InvalidEmf(format!(
                    "record 0x{:X} at offset {} has invalid size {}",
                    header.record_type, offset, size
                ))
            })?;
        let record = &data[offset..end];
        trace!(record_type = header.record_type, offset, size, "EMF record");

        match header.record_type {
            EMR_HEADER => {
                if let Ok((prefix, _)) = HeaderPrefix::read_from_prefix(record) {
                    frame = Some(prefix.bounds);
                }
            },
            EMR_STRETCHDIBITS | EMR_SETDIBITSTODEVICE => {
                if let Some(blit) = dib_blit(header.record_type, record) {
                    match image::load_from_memory_with_format(&blit.bmp, ImageFormat::Bmp) {
                        Ok(img) => match place(img, &blit, frame) {
                            Some(img) => return Ok(img),
                            None => debug!(offset, placement = ?blit.placement, "skipping DIB record drawn outside the frame"),
                        },
                        Err(e) => debug!(offset, error = %e, "skipping undecodable DIB record"),
                    }
                }
            },
            EMR_EOF => break,
            _ => {},
        }

        offset = end;
    }

    Err(RasterError::NoEmbeddedBitmap)
}

/// Wrap the bitmap carried by a DIB record in a BMP file header.
///
/// Returns `None` when the record's descriptors do not fit inside it.
fn dib_blit(record_type: u32, record: &[u8]) -> Option<DibBlit> {
    let (prefix, rest) = DibRecordPrefix::read_from_prefix(record).ok()?;
    if prefix.cb_bmi_src < MIN_BMI_LEN || prefix.cb_bits_src == 0 {
        return None;
    }

    let (cx_dest, cy_dest) = if record_type == EMR_STRETCHDIBITS {
        let (tail, _) = StretchDibitsTail::read_from_prefix(rest).ok()?;
        (tail.cx_dest, tail.cy_dest)
    } else {
        (prefix.cx_src, prefix.cy_src)
    };

    let bmi = slice_at(record, prefix.off_bmi_src, prefix.cb_bmi_src)?;
    let bits = slice_at(record, prefix.off_bits_src, prefix.cb_bits_src)?;
    let bi_height = i32::from_le_bytes(bmi.get(BMI_HEIGHT_OFFSET..BMI_HEIGHT_OFFSET + 4)?.try_into().ok()?);

    let pixel_offset = BMP_FILE_HEADER_LEN.checked_add(prefix.cb_bmi_src)?;
    let file_size = pixel_offset.checked_add(prefix.cb_bits_src)?;

    let mut bmp = Vec::with_capacity(file_size as usize);
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&file_size.to_le_bytes());
    bmp.extend_from_slice(&[0u8; 4]);
    bmp.extend_from_slice(&pixel_offset.to_le_bytes());
    bmp.extend_from_slice(bmi);
    bmp.extend_from_slice(bits);

    Some(DibBlit {
        bmp,
        placement: Placement {
            x_dest: prefix.x_dest,
            y_dest: prefix.y_dest,
            x_src: prefix.x_src,
            y_src: prefix.y_src,
            cx_src: prefix.cx_src,
            cy_src: prefix.cy_src,
            cx_dest,
            cy_dest,
        },
        bottom_up: bi_height > 0,
    })
}

/// Draw a decoded DIB the way its record places it inside `frame`.
///
/// Returns `None` for placements that cannot be drawn: empty or mirrored
/// rectangles, a source rectangle outside the bitmap, or an oversized frame.
fn place(dib: DynamicImage, blit: &DibBlit, frame: Option<RectL>) -> Option<DynamicImage> {
    let p = blit.placement;
    let Some(frame) = frame else {
        return Some(dib);
    };

    let frame_w = i64::from(frame.right) - i64::from(frame.left) + 1;
    let frame_h = i64::from(frame.bottom) - i64::from(frame.top) + 1;
    if frame_w <= 0 || frame_h <= 0 || frame_w > MAX_CANVAS_SIDE || frame_h > MAX_CANVAS_SIDE {
        return None;
    }
    if p.cx_src <= 0 || p.cy_src <= 0 || p.cx_dest <= 0 || p.cy_dest <= 0 || p.x_src < 0 || p.y_src < 0 {
        return None;
    }

    let (width, height) = dib.dimensions();
    let (x_src, y_src) = (p.x_src as u32, p.y_src as u32);
    let (cx_src, cy_src) = (p.cx_src as u32, p.cy_src as u32);
    if x_src.checked_add(cx_src)? > width || y_src.checked_add(cy_src)? > height {
        return None;
    }

    let full_source = x_src == 0 && y_src == 0 && cx_src == width && cy_src == height;
    let unscaled = p.cx_dest == p.cx_src && p.cy_dest == p.cy_src;
    let at_origin = p.x_dest == frame.left && p.y_dest == frame.top;
    let fills_frame = i64::from(p.cx_dest) == frame_w && i64::from(p.cy_dest) == frame_h;
    if full_source && unscaled && at_origin && fills_frame {
        return Some(dib);
    }

    // Source y runs up from the bottom row of a bottom-up DIB.
    let top = if blit.bottom_up {
        height - y_src - cy_src
    } else {
        y_src
    };
    let mut sprite = dib.crop_imm(x_src, top, cx_src, cy_src);
    if !unscaled {
        sprite = sprite.resize_exact(p.cx_dest as u32, p.cy_dest as u32, FilterType::Nearest);
    }

    let mut canvas = RgbaImage::new(frame_w as u32, frame_h as u32);
    imageops::overlay(
        &mut canvas,
        &sprite.to_rgba8(),
        i64::from(p.x_dest) - i64::from(frame.left),
        i64::from(p.y_dest) - i64::from(frame.top),
    );
    Some(DynamicImage::ImageRgba8(canvas))
}

#[inline]
fn slice_at(data: &[u8], offset: u32, len: u32) -> Option<&[u8]> {
    let start = offset as usize;
    let end = start.checked_add(len as usize)?;
    data.get(start..end)
}
