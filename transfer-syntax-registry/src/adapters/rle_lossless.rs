//! Support for RLE Lossless image decoding and encoding.
//!
//! Each frame is one fragment made of a 64-byte header
//! followed by up to 15 PackBits segments.
//! Every segment holds one byte of one sample for all pixels of the frame,
//! ordered from the most significant byte of the first sample
//! to the least significant byte of the last sample.
//!
//! See <https://dicom.nema.org/medical/dicom/current/output/chtml/part05/chapter_G.html>
use byteordered::byteorder::{ByteOrder, LittleEndian};

use dcmkit_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, PixelDataDescriptor,
    PixelDataReader, PixelDataWriter,
};
use dcmkit_encoding::snafu::prelude::*;
use tracing::warn;

/// Size of the RLE header in bytes.
const HEADER_LEN: usize = 64;

/// Maximum number of segments in a frame.
const MAX_SEGMENTS: usize = 15;

/// Maximum number of bytes covered by a single PackBits run.
const MAX_RUN: usize = 128;

/// Pixel data adapter for the RLE Lossless transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RleLosslessAdapter;

/// Pixel data decoder for RLE Lossless (UID `1.2.840.10008.1.2.5`)
impl PixelDataReader for RleLosslessAdapter {
    fn decode_frame(
        &self,
        data: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        dst: &mut Vec<u8>,
    ) -> DecodeResult<()> {
        descriptor
            .validate()
            .map_err(|e| decode_error::InvalidDescriptorSnafu { reason: e.reason() }.build())?;
        ensure!(
            frame < descriptor.number_of_frames,
            decode_error::FrameRangeOutOfBoundsSnafu { frame }
        );

        let bytes_per_sample = descriptor.bytes_per_sample();
        let samples_per_pixel = usize::from(descriptor.samples_per_pixel);
        let pixels = descriptor.pixels_per_frame();

        let offsets = read_rle_header(data)?;
        if offsets.len() != bytes_per_sample * samples_per_pixel {
            whatever!(
                "RLE header declares {} segments, but {} are needed",
                offsets.len(),
                bytes_per_sample * samples_per_pixel
            );
        }

        // extend `dst` to make room for the decoded frame
        let base_offset = dst.len();
        dst.resize(base_offset + descriptor.bytes_per_frame(), 0);
        let frame_out = &mut dst[base_offset..];

        let mut decoded_segment = Vec::with_capacity(pixels);
        for (i, &start) in offsets.iter().enumerate() {
            let end = offsets.get(i + 1).copied().unwrap_or(data.len());
            if start > end || end > data.len() {
                whatever!("RLE segment #{} is out of bounds ({}..{})", i, start, end);
            }

            decoded_segment.clear();
            unpack_bits(&data[start..end], pixels, &mut decoded_segment);
            if decoded_segment.len() < pixels {
                warn!(
                    "RLE segment #{} is short ({} of {} bytes), padding with zeros",
                    i,
                    decoded_segment.len(),
                    pixels
                );
                decoded_segment.resize(pixels, 0);
            }

            // segments come most significant byte first
            let sample = i / bytes_per_sample;
            let byte = bytes_per_sample - 1 - i % bytes_per_sample;
            for (pixel, value) in decoded_segment.iter().enumerate() {
                frame_out[descriptor.sample_offset(pixel, sample) + byte] = *value;
            }
        }
        Ok(())
    }
}

/// Pixel data encoder for RLE Lossless (UID `1.2.840.10008.1.2.5`)
impl PixelDataWriter for RleLosslessAdapter {
    fn can_encode(&self, _options: &EncodeOptions, descriptor: &PixelDataDescriptor) -> bool {
        descriptor.validate().is_ok()
            && descriptor.bytes_per_sample() * usize::from(descriptor.samples_per_pixel)
                <= MAX_SEGMENTS
    }

    fn encode_frame(
        &self,
        raw: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        if !self.can_encode(options, descriptor) {
            return encode_error::UnsupportedSnafu {
                reason: format!(
                    "RLE Lossless cannot encode {} samples of {} bits",
                    descriptor.samples_per_pixel, descriptor.bits_allocated
                ),
            }
            .fail();
        }
        let range = descriptor
            .frame_range(frame)
            .context(encode_error::FrameRangeOutOfBoundsSnafu { frame })?;
        if range.end > raw.len() {
            whatever!(
                "Native pixel data is too short for frame #{} ({} of {} bytes)",
                frame,
                raw.len(),
                range.end
            );
        }
        let frame_in = &raw[range];

        let bytes_per_sample = descriptor.bytes_per_sample();
        let samples_per_pixel = usize::from(descriptor.samples_per_pixel);
        let columns = usize::from(descriptor.columns);
        let n_segments = bytes_per_sample * samples_per_pixel;

        let mut segments = Vec::with_capacity(n_segments);
        let mut row = Vec::with_capacity(columns);
        for i in 0..n_segments {
            let sample = i / bytes_per_sample;
            let byte = bytes_per_sample - 1 - i % bytes_per_sample;
            let mut segment = Vec::new();
            // runs never cross the end of a row
            for r in 0..usize::from(descriptor.rows) {
                row.clear();
                row.extend(
                    (r * columns..(r + 1) * columns)
                        .map(|pixel| frame_in[descriptor.sample_offset(pixel, sample) + byte]),
                );
                pack_bits(&row, &mut segment);
            }
            if segment.len() % 2 == 1 {
                segment.push(0);
            }
            segments.push(segment);
        }

        let mut header = [0u8; HEADER_LEN];
        LittleEndian::write_u32(&mut header[0..4], n_segments as u32);
        let mut offset = HEADER_LEN;
        for (i, segment) in segments.iter().enumerate() {
            LittleEndian::write_u32(&mut header[4 + i * 4..8 + i * 4], offset as u32);
            offset += segment.len();
        }

        dst.reserve(offset);
        dst.extend_from_slice(&header);
        for segment in &segments {
            dst.extend_from_slice(segment);
        }
        Ok(())
    }
}

/// Read the RLE header and return the offsets of the declared segments.
fn read_rle_header(fragment: &[u8]) -> DecodeResult<Vec<usize>> {
    if fragment.len() < HEADER_LEN {
        whatever!(
            "RLE frame is too short for its header ({} bytes)",
            fragment.len()
        );
    }
    let nr_segments = LittleEndian::read_u32(&fragment[0..4]) as usize;
    if nr_segments == 0 || nr_segments > MAX_SEGMENTS {
        whatever!("Invalid number of RLE segments: {}", nr_segments);
    }
    let mut offsets = [0u32; MAX_SEGMENTS];
    LittleEndian::read_u32_into(&fragment[4..HEADER_LEN], &mut offsets);
    Ok(offsets[..nr_segments]
        .iter()
        .map(|&o| o as usize)
        .collect())
}

/// Decode a PackBits segment into `out`,
/// stopping once `expected` bytes have been produced
/// or when the segment runs out.
fn unpack_bits(segment: &[u8], expected: usize, out: &mut Vec<u8>) {
    let mut i = 0;
    while i < segment.len() && out.len() < expected {
        let h = segment[i] as i8;
        i += 1;
        if h >= 0 {
            let end = usize::min(i + h as usize + 1, segment.len());
            out.extend_from_slice(&segment[i..end]);
            i = end;
        } else if h != -128 {
            if let Some(&value) = segment.get(i) {
                let new_len = out.len() + (1 - isize::from(h)) as usize;
                out.resize(new_len, value);
            }
            i += 1;
        }
        // h = -128 is a no-op
    }
    out.truncate(expected);
}

/// Encode a row of bytes with PackBits, appending the result to `out`.
fn pack_bits(row: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < row.len() {
        let mut run = 1;
        while i + run < row.len() && run < MAX_RUN && row[i + run] == row[i] {
            run += 1;
        }
        if run > 1 {
            // control byte -(run - 1)
            out.push((257 - run) as u8);
            out.push(row[i]);
            i += run;
            continue;
        }

        let start = i;
        i += 1;
        while i < row.len() && i - start < MAX_RUN {
            if i + 1 < row.len() && row[i] == row[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&row[start..i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packbits() {
        let encoded = vec![
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let mut decoded = Vec::new();
        unpack_bits(&encoded, 100, &mut decoded);

        let expected = vec![
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn unpack_stops_at_expected_length() {
        let mut decoded = Vec::new();
        unpack_bits(&[0xF7, 0xAA, 0x01, 0x01, 0x02], 4, &mut decoded);
        assert_eq!(decoded, vec![0xAA; 4]);
    }

    #[test]
    fn unpack_truncated_literal() {
        let mut decoded = Vec::new();
        unpack_bits(&[0x04, 0x01, 0x02], 5, &mut decoded);
        assert_eq!(decoded, vec![0x01, 0x02]);
    }

    #[test]
    fn pack_bits_runs_and_literals() {
        let mut out = Vec::new();
        pack_bits(&[7, 7, 7, 1, 2, 3, 9, 9], &mut out);
        assert_eq!(out, vec![0xFE, 7, 0x02, 1, 2, 3, 0xFF, 9]);

        let mut decoded = Vec::new();
        unpack_bits(&out, 8, &mut decoded);
        assert_eq!(decoded, vec![7, 7, 7, 1, 2, 3, 9, 9]);
    }

    #[test]
    fn pack_bits_splits_long_runs() {
        let row = vec![0x11; 300];
        let mut out = Vec::new();
        pack_bits(&row, &mut out);
        // 128 + 128 + 44
        assert_eq!(out, vec![0x81, 0x11, 0x81, 0x11, 0xD5, 0x11]);

        let literal: Vec<u8> = (0..=255u8).chain(0..10).collect();
        let mut out = Vec::new();
        pack_bits(&literal, &mut out);
        assert_eq!(out[0], 0x7F);
        assert_eq!(out[129], 0x7F);
        assert_eq!(out[258], 0x09);
        let mut decoded = Vec::new();
        unpack_bits(&out, literal.len(), &mut decoded);
        assert_eq!(decoded, literal);
    }

    #[test]
    fn header_segment_count_is_checked() {
        let mut data = vec![0u8; HEADER_LEN];
        assert!(read_rle_header(&data).is_err());
        data[0] = 16;
        assert!(read_rle_header(&data).is_err());
        data[0] = 2;
        data[4] = 64;
        data[8] = 70;
        assert_eq!(read_rle_header(&data).unwrap(), vec![64, 70]);
        assert!(read_rle_header(&data[..10]).is_err());
    }
}
