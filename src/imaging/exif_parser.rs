//! Minimal EXIF parser for JPEG files.
//!
//! Extracts the handful of camera fields the viewer shows in its info panel:
//! - Make (0x010F) + Model (0x0110), merged into one camera name
//! - DateTime (0x0132) / DateTimeOriginal (0x9003)
//! - ExposureTime (0x829A), FNumber (0x829D), ISO (0x8827), FocalLength (0x920A)
//!   from the Exif sub-IFD (pointer tag 0x8769)
//!
//! The walk is: SOI marker → JPEG segments → APP1 with `Exif\0\0` → TIFF
//! header (`II`/`MM` picks the byte order once) → 0th IFD → Exif sub-IFD.
//!
//! Every read goes through [`TiffReader`], which bounds-checks and returns
//! `None` past the end of the data. Any structural mismatch stops the walk
//! and keeps whatever fields were already recovered; nothing here returns an
//! error.

use serde::Serialize;

/// Camera metadata recovered from a file's EXIF block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExifMetadata {
    pub camera: Option<String>,
    pub date_time: Option<String>,
    pub exposure: Option<String>,
    pub aperture: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    /// True iff at least one field above was recovered.
    pub present: bool,
}

/// Extract EXIF metadata from raw file bytes. Never fails.
pub fn extract(data: &[u8]) -> ExifMetadata {
    let mut fields = ExifFields::default();
    if let Some(tiff) = find_exif_tiff(data) {
        // A truncated walk still keeps what it found before bailing.
        let _ = walk_tiff(tiff, &mut fields);
    }
    fields.finish()
}

// ---------------------------------------------------------------------------
// Byte-order aware reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// Bounds-checked view over a TIFF block. Offsets are relative to the start
/// of the TIFF header, as they are in the IFD entries themselves.
#[derive(Clone, Copy)]
struct TiffReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> TiffReader<'a> {
    /// Resolve the byte order from the `II`/`MM` tag at the start of `data`.
    fn new(data: &'a [u8]) -> Option<Self> {
        let order = match data.get(0..2)? {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return None,
        };
        Some(Self { data, order })
    }

    fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes(offset, 2)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes(offset, 4)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        })
    }

    /// Unsigned rational stored at `offset`: numerator then denominator.
    fn rational_at(&self, offset: usize) -> Option<(u32, u32)> {
        Some((self.u32_at(offset)?, self.u32_at(offset + 4)?))
    }

    /// Number of entries in the IFD at `offset`.
    fn entry_count(&self, ifd: usize) -> Option<usize> {
        self.u16_at(ifd).map(usize::from)
    }

    /// The `index`-th 12-byte entry of the IFD at `ifd`.
    fn entry(&self, ifd: usize, index: usize) -> Option<IfdEntry> {
        let at = ifd + 2 + index * 12;
        Some(IfdEntry {
            tag: self.u16_at(at)?,
            typ: self.u16_at(at + 2)?,
            count: self.u32_at(at + 4)?,
            value_offset: at + 8,
        })
    }

    /// The value field interpreted as a 32-bit offset into the TIFF block.
    fn pointer(&self, entry: &IfdEntry) -> Option<usize> {
        self.u32_at(entry.value_offset).map(|v| v as usize)
    }

    /// ASCII value of an entry: inline when it fits in 4 bytes, otherwise
    /// stored at the offset held in the value field.
    fn ascii(&self, entry: &IfdEntry) -> Option<String> {
        let len = entry.count as usize;
        let start = if len > 4 {
            self.pointer(entry)?
        } else {
            entry.value_offset
        };
        let raw = self.bytes(start, len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text = String::from_utf8_lossy(&raw[..end]).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// SHORT or LONG scalar held inline in the value field.
    fn unsigned(&self, entry: &IfdEntry) -> Option<u32> {
        match entry.typ {
            TYPE_SHORT => self.u16_at(entry.value_offset).map(u32::from),
            TYPE_LONG => self.u32_at(entry.value_offset),
            _ => None,
        }
    }

    /// RATIONAL value; always stored out of line.
    fn rational(&self, entry: &IfdEntry) -> Option<(u32, u32)> {
        if entry.typ != TYPE_RATIONAL {
            return None;
        }
        self.rational_at(self.pointer(entry)?)
    }
}

#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    typ: u16,
    count: u32,
    /// Absolute position (within the TIFF block) of the entry's 4-byte value field.
    value_offset: usize,
}

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO: u16 = 0x8827;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_FOCAL_LENGTH: u16 = 0x920A;

// ---------------------------------------------------------------------------
// JPEG: locate the TIFF block inside APP1
// ---------------------------------------------------------------------------

const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";
const MARKER_SOI: u8 = 0xD8;
const MARKER_APP1: u8 = 0xE1;
const MARKER_SOS: u8 = 0xDA;

/// Walk the JPEG segment list and return the TIFF block of the first APP1
/// segment carrying the `Exif\0\0` signature.
fn find_exif_tiff(data: &[u8]) -> Option<&[u8]> {
    if data.get(0..2)? != [0xFF, MARKER_SOI] {
        return None;
    }

    let mut pos = 2;
    loop {
        let marker = data.get(pos..pos + 2)?;
        if marker[0] != 0xFF || marker[1] == MARKER_SOS {
            return None;
        }
        let seg_len = u16::from_be_bytes(data.get(pos + 2..pos + 4)?.try_into().ok()?) as usize;
        // The length counts its own two bytes.
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = pos + 2 + seg_len;

        if marker[1] == MARKER_APP1 {
            let segment = data.get(seg_start..seg_end.min(data.len()))?;
            if let Some(tiff) = segment.strip_prefix(EXIF_SIGNATURE) {
                return Some(tiff);
            }
        }

        pos = seg_end;
    }
}

// ---------------------------------------------------------------------------
// TIFF: 0th IFD + Exif sub-IFD
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ExifFields {
    make: Option<String>,
    model: Option<String>,
    date_time: Option<String>,
    exposure: Option<String>,
    aperture: Option<String>,
    iso: Option<String>,
    focal_length: Option<String>,
}

impl ExifFields {
    fn finish(self) -> ExifMetadata {
        let camera = merge_camera_name(self.make, self.model);
        let present = camera.is_some()
            || self.date_time.is_some()
            || self.exposure.is_some()
            || self.aperture.is_some()
            || self.iso.is_some()
            || self.focal_length.is_some();
        ExifMetadata {
            camera,
            date_time: self.date_time,
            exposure: self.exposure,
            aperture: self.aperture,
            iso: self.iso,
            focal_length: self.focal_length,
            present,
        }
    }
}

/// Walk the 0th IFD, descending into the Exif sub-IFD when its pointer shows
/// up. Returns `None` at the first out-of-bounds read.
fn walk_tiff(tiff: &[u8], fields: &mut ExifFields) -> Option<()> {
    let reader = TiffReader::new(tiff)?;
    let ifd0 = reader.u32_at(4)? as usize;

    for i in 0..reader.entry_count(ifd0)? {
        let entry = reader.entry(ifd0, i)?;
        match (entry.tag, entry.typ) {
            (TAG_MAKE, TYPE_ASCII) => fields.make = reader.ascii(&entry),
            (TAG_MODEL, TYPE_ASCII) => fields.model = reader.ascii(&entry),
            (TAG_DATE_TIME | TAG_DATE_TIME_ORIGINAL, TYPE_ASCII) => {
                if let Some(dt) = reader.ascii(&entry) {
                    fields.date_time = Some(dt);
                }
            }
            (TAG_EXIF_IFD, _) => {
                let sub = reader.pointer(&entry)?;
                walk_exif_ifd(&reader, sub, fields)?;
            }
            _ => {}
        }
    }
    Some(())
}

fn walk_exif_ifd(reader: &TiffReader<'_>, offset: usize, fields: &mut ExifFields) -> Option<()> {
    for i in 0..reader.entry_count(offset)? {
        let entry = reader.entry(offset, i)?;
        match entry.tag {
            TAG_EXPOSURE_TIME => {
                if let Some(text) = reader.rational(&entry).and_then(format_exposure) {
                    fields.exposure = Some(text);
                }
            }
            TAG_F_NUMBER => {
                if let Some(text) = reader.rational(&entry).and_then(format_aperture) {
                    fields.aperture = Some(text);
                }
            }
            TAG_ISO => {
                if let Some(iso) = reader.unsigned(&entry) {
                    fields.iso = Some(iso.to_string());
                }
            }
            TAG_FOCAL_LENGTH => {
                if let Some(text) = reader.rational(&entry).and_then(format_focal_length) {
                    fields.focal_length = Some(text);
                }
            }
            TAG_DATE_TIME_ORIGINAL if entry.typ == TYPE_ASCII => {
                if let Some(dt) = reader.ascii(&entry) {
                    fields.date_time = Some(dt);
                }
            }
            _ => {}
        }
    }
    Some(())
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `1/250` for unit numerators, `n/d` otherwise.
fn format_exposure((num, den): (u32, u32)) -> Option<String> {
    if den == 0 {
        return None;
    }
    Some(if num == 1 {
        format!("1/{den}")
    } else {
        format!("{num}/{den}")
    })
}

fn format_aperture((num, den): (u32, u32)) -> Option<String> {
    if den == 0 {
        return None;
    }
    Some(format!("f/{:.1}", num as f64 / den as f64))
}

fn format_focal_length((num, den): (u32, u32)) -> Option<String> {
    if den == 0 {
        return None;
    }
    Some(format!("{}mm", num / den))
}

/// Combine Make and Model, dropping Make when Model already starts with it
/// (e.g. Make "Canon", Model "Canon EOS R5").
fn merge_camera_name(make: Option<String>, model: Option<String>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) if model.starts_with(&make) => Some(model),
        (Some(make), Some(model)) => Some(format!("{make} {model}")),
        (None, Some(model)) => Some(model),
        (Some(make), None) => Some(make),
        (None, None) => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builder for small synthetic EXIF JPEGs. Values that do not fit inline
    /// are appended to a data area after both IFDs.
    pub(crate) struct ExifBuilder {
        big_endian: bool,
        ifd0: Vec<(u16, u16, u32, Value)>,
        exif: Vec<(u16, u16, u32, Value)>,
    }

    #[derive(Clone)]
    pub(crate) enum Value {
        Ascii(String),
        Short(u16),
        Long(u32),
        Rational(u32, u32),
    }

    impl ExifBuilder {
        pub(crate) fn new(big_endian: bool) -> Self {
            Self {
                big_endian,
                ifd0: Vec::new(),
                exif: Vec::new(),
            }
        }

        pub(crate) fn ascii(mut self, tag: u16, text: &str) -> Self {
            let count = text.len() as u32 + 1;
            self.ifd0
                .push((tag, TYPE_ASCII, count, Value::Ascii(text.to_string())));
            self
        }

        pub(crate) fn exif_ascii(mut self, tag: u16, text: &str) -> Self {
            let count = text.len() as u32 + 1;
            self.exif
                .push((tag, TYPE_ASCII, count, Value::Ascii(text.to_string())));
            self
        }

        pub(crate) fn exif_rational(mut self, tag: u16, num: u32, den: u32) -> Self {
            self.exif
                .push((tag, TYPE_RATIONAL, 1, Value::Rational(num, den)));
            self
        }

        pub(crate) fn exif_short(mut self, tag: u16, v: u16) -> Self {
            self.exif.push((tag, TYPE_SHORT, 1, Value::Short(v)));
            self
        }

        pub(crate) fn exif_long(mut self, tag: u16, v: u32) -> Self {
            self.exif.push((tag, TYPE_LONG, 1, Value::Long(v)));
            self
        }

        fn u16b(&self, v: u16) -> [u8; 2] {
            if self.big_endian {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            }
        }

        fn u32b(&self, v: u32) -> [u8; 4] {
            if self.big_endian {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            }
        }

        /// Raw TIFF block (what follows `Exif\0\0`).
        pub(crate) fn tiff(&self) -> Vec<u8> {
            let mut ifd0 = self.ifd0.clone();
            let has_exif = !self.exif.is_empty();
            if has_exif {
                ifd0.push((TAG_EXIF_IFD, TYPE_LONG, 1, Value::Long(0)));
            }

            let ifd_size = |n: usize| 2 + n * 12 + 4;
            let ifd0_at = 8usize;
            let exif_at = ifd0_at + ifd_size(ifd0.len());
            let mut data_at = exif_at + if has_exif { ifd_size(self.exif.len()) } else { 0 };

            let mut out = Vec::new();
            out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
            out.extend_from_slice(&self.u16b(42));
            out.extend_from_slice(&self.u32b(ifd0_at as u32));

            let mut data = Vec::new();
            let mut write_ifd = |out: &mut Vec<u8>, entries: &[(u16, u16, u32, Value)]| {
                out.extend_from_slice(&self.u16b(entries.len() as u16));
                for (tag, typ, count, value) in entries {
                    out.extend_from_slice(&self.u16b(*tag));
                    out.extend_from_slice(&self.u16b(*typ));
                    out.extend_from_slice(&self.u32b(*count));
                    let mut field = [0u8; 4];
                    match value {
                        Value::Ascii(text) => {
                            let mut bytes = text.as_bytes().to_vec();
                            bytes.push(0);
                            if bytes.len() <= 4 {
                                field[..bytes.len()].copy_from_slice(&bytes);
                            } else {
                                field = self.u32b(data_at as u32);
                                data_at += bytes.len();
                                data.extend_from_slice(&bytes);
                            }
                        }
                        Value::Short(v) => field[..2].copy_from_slice(&self.u16b(*v)),
                        Value::Long(_) if *tag == TAG_EXIF_IFD => {
                            field = self.u32b(exif_at as u32)
                        }
                        Value::Long(v) => field = self.u32b(*v),
                        Value::Rational(n, d) => {
                            field = self.u32b(data_at as u32);
                            data_at += 8;
                            data.extend_from_slice(&self.u32b(*n));
                            data.extend_from_slice(&self.u32b(*d));
                        }
                    }
                    out.extend_from_slice(&field);
                }
                out.extend_from_slice(&[0, 0, 0, 0]);
            };
            write_ifd(&mut out, &ifd0);
            if has_exif {
                write_ifd(&mut out, &self.exif);
            }
            out.extend_from_slice(&data);
            out
        }

        /// Full JPEG: SOI, APP1 with the TIFF block, EOI.
        pub(crate) fn jpeg(&self) -> Vec<u8> {
            let tiff = self.tiff();
            let mut out = vec![0xFF, MARKER_SOI];
            let seg_len = (2 + EXIF_SIGNATURE.len() + tiff.len()) as u16;
            out.extend_from_slice(&[0xFF, MARKER_APP1]);
            out.extend_from_slice(&seg_len.to_be_bytes());
            out.extend_from_slice(EXIF_SIGNATURE);
            out.extend_from_slice(&tiff);
            out.extend_from_slice(&[0xFF, 0xD9]);
            out
        }
    }

    fn full_builder(big_endian: bool) -> ExifBuilder {
        ExifBuilder::new(big_endian)
            .ascii(TAG_MAKE, "NIKON CORPORATION")
            .ascii(TAG_MODEL, "NIKON D750")
            .ascii(TAG_DATE_TIME, "2021:06:01 10:00:00")
            .exif_rational(TAG_EXPOSURE_TIME, 1, 250)
            .exif_rational(TAG_F_NUMBER, 28, 10)
            .exif_short(TAG_ISO, 400)
            .exif_rational(TAG_FOCAL_LENGTH, 500, 10)
            .exif_ascii(TAG_DATE_TIME_ORIGINAL, "2021:05:31 18:42:07")
    }

    #[test]
    fn png_signature_is_not_exif() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let meta = extract(&png);
        assert!(!meta.present);
        assert_eq!(meta, ExifMetadata::default());
    }

    #[test]
    fn empty_input_is_not_exif() {
        assert_eq!(extract(&[]), ExifMetadata::default());
        assert_eq!(extract(&[0xFF]), ExifMetadata::default());
    }

    #[test]
    fn little_endian_full_record() {
        let meta = extract(&full_builder(false).jpeg());
        assert!(meta.present);
        // Model does not start with "NIKON CORPORATION", so both are kept
        assert_eq!(
            meta.camera.as_deref(),
            Some("NIKON CORPORATION NIKON D750")
        );
        // DateTimeOriginal in the sub-IFD wins over DateTime
        assert_eq!(meta.date_time.as_deref(), Some("2021:05:31 18:42:07"));
        assert_eq!(meta.exposure.as_deref(), Some("1/250"));
        assert_eq!(meta.aperture.as_deref(), Some("f/2.8"));
        assert_eq!(meta.iso.as_deref(), Some("400"));
        assert_eq!(meta.focal_length.as_deref(), Some("50mm"));
    }

    #[test]
    fn big_endian_matches_little_endian() {
        assert_eq!(
            extract(&full_builder(true).jpeg()),
            extract(&full_builder(false).jpeg())
        );
    }

    #[test]
    fn model_prefixed_by_make_drops_make() {
        let jpeg = ExifBuilder::new(false)
            .ascii(TAG_MAKE, "Canon")
            .ascii(TAG_MODEL, "Canon EOS R5")
            .jpeg();
        assert_eq!(extract(&jpeg).camera.as_deref(), Some("Canon EOS R5"));
    }

    #[test]
    fn short_ascii_is_read_inline() {
        let jpeg = ExifBuilder::new(true).ascii(TAG_MODEL, "X1").jpeg();
        let meta = extract(&jpeg);
        assert_eq!(meta.camera.as_deref(), Some("X1"));
        assert!(meta.present);
    }

    #[test]
    fn non_unit_exposure_keeps_numerator() {
        let jpeg = ExifBuilder::new(false)
            .exif_rational(TAG_EXPOSURE_TIME, 13, 10)
            .jpeg();
        assert_eq!(extract(&jpeg).exposure.as_deref(), Some("13/10"));
    }

    #[test]
    fn zero_denominator_is_skipped() {
        let jpeg = ExifBuilder::new(false)
            .exif_rational(TAG_F_NUMBER, 28, 0)
            .jpeg();
        let meta = extract(&jpeg);
        assert_eq!(meta.aperture, None);
        assert!(!meta.present);
    }

    #[test]
    fn iso_as_long() {
        let jpeg = ExifBuilder::new(true).exif_long(TAG_ISO, 12800).jpeg();
        assert_eq!(extract(&jpeg).iso.as_deref(), Some("12800"));
    }

    #[test]
    fn only_iso_still_counts_as_present() {
        let jpeg = ExifBuilder::new(false).exif_short(TAG_ISO, 100).jpeg();
        assert!(extract(&jpeg).present);
    }

    #[test]
    fn truncated_walk_keeps_earlier_fields() {
        let mut jpeg = full_builder(false).jpeg();
        // Drop EOI, then the DateTimeOriginal string (20 bytes) and the
        // FocalLength rational (8 bytes) from the end of the data area.
        let len = jpeg.len();
        jpeg.truncate(len - 2 - 20 - 8);
        let meta = extract(&jpeg);
        assert!(meta.present);
        assert_eq!(
            meta.camera.as_deref(),
            Some("NIKON CORPORATION NIKON D750")
        );
        assert_eq!(meta.date_time.as_deref(), Some("2021:06:01 10:00:00"));
        assert_eq!(meta.exposure.as_deref(), Some("1/250"));
        assert_eq!(meta.iso.as_deref(), Some("400"));
        assert_eq!(meta.focal_length, None);
    }

    #[test]
    fn truncated_directory_keeps_entries_before_the_cut() {
        let jpeg = ExifBuilder::new(false)
            .ascii(TAG_MODEL, "Q2")
            .ascii(TAG_MAKE, "Leica")
            .jpeg();
        // SOI + APP1 header + signature + TIFF header + count + first entry
        let cut = 2 + 4 + EXIF_SIGNATURE.len() + 8 + 2 + 12;
        let meta = extract(&jpeg[..cut]);
        assert_eq!(meta.camera.as_deref(), Some("Q2"));
    }

    #[test]
    fn skips_non_exif_app1_and_other_segments() {
        let mut jpeg = vec![0xFF, MARKER_SOI];
        // APP0 (JFIF)
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x07, b'J', b'F', b'I', b'F', 0]);
        // APP1 carrying XMP rather than Exif
        let xmp = b"http://ns.adobe.com/xap/1.0/\0";
        jpeg.extend_from_slice(&[0xFF, MARKER_APP1]);
        jpeg.extend_from_slice(&((xmp.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(xmp);
        // Real Exif segment after both
        let exif = ExifBuilder::new(false).ascii(TAG_MODEL, "Pixel 8").jpeg();
        jpeg.extend_from_slice(&exif[2..]);

        assert_eq!(extract(&jpeg).camera.as_deref(), Some("Pixel 8"));
    }

    #[test]
    fn bad_segment_length_aborts() {
        let jpeg = [0xFF, MARKER_SOI, 0xFF, MARKER_APP1, 0x00, 0x01];
        assert_eq!(extract(&jpeg), ExifMetadata::default());
    }

    #[test]
    fn unknown_byte_order_aborts() {
        let mut jpeg = full_builder(false).jpeg();
        let tiff_at = 2 + 4 + EXIF_SIGNATURE.len();
        jpeg[tiff_at] = b'X';
        assert_eq!(extract(&jpeg), ExifMetadata::default());
    }

    #[test]
    fn merge_camera_name_cases() {
        let s = |v: &str| Some(v.to_string());
        assert_eq!(merge_camera_name(None, None), None);
        assert_eq!(merge_camera_name(s("Sony"), None), s("Sony"));
        assert_eq!(merge_camera_name(None, s("A7")), s("A7"));
        assert_eq!(merge_camera_name(s("Sony"), s("ILCE-7")), s("Sony ILCE-7"));
    }
}
