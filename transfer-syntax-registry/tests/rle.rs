//! RLE Lossless decoding and encoding through the registry.
#![cfg(feature = "rle")]

use dcmkit_core::uids;
use dcmkit_encoding::adapters::{
    EncodeOptions, PhotometricInterpretation, PixelDataDescriptor, PixelDataReader,
    PixelDataWriter,
};
use dcmkit_transfer_syntax_registry::adapters::rle_lossless::RleLosslessAdapter;
use dcmkit_transfer_syntax_registry::{Error, TransferSyntaxRegistry};

/// Build an RLE frame from the given segments.
fn rle_frame(segments: &[&[u8]]) -> Vec<u8> {
    let mut header = vec![0u8; 64];
    header[0..4].copy_from_slice(&(segments.len() as u32).to_le_bytes());
    let mut offset = 64u32;
    for (i, segment) in segments.iter().enumerate() {
        header[4 + i * 4..8 + i * 4].copy_from_slice(&offset.to_le_bytes());
        offset += segment.len() as u32;
    }
    let mut out = header;
    for segment in segments {
        out.extend_from_slice(segment);
    }
    out
}

fn rgb16(rows: u16, columns: u16, planar_configuration: u16) -> PixelDataDescriptor {
    PixelDataDescriptor {
        rows,
        columns,
        number_of_frames: 1,
        bits_allocated: 16,
        bits_stored: 16,
        high_bit: 15,
        signed: false,
        samples_per_pixel: 3,
        photometric_interpretation: PhotometricInterpretation::Rgb,
        planar_configuration,
    }
}

#[test]
fn decode_literal_run() {
    let desc = PixelDataDescriptor::new_monochrome(1, 3, 8);
    let data = rle_frame(&[&[0x02, 0x01, 0x02, 0x03]]);
    let mut out = Vec::new();
    RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut out)
        .unwrap();
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn decode_replicate_run() {
    let desc = PixelDataDescriptor::new_monochrome(1, 3, 8);
    let data = rle_frame(&[&[0xFE, 0x05]]);
    let mut out = Vec::new();
    RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut out)
        .unwrap();
    assert_eq!(out, vec![5, 5, 5]);
}

#[test]
fn decode_skips_no_op() {
    let desc = PixelDataDescriptor::new_monochrome(1, 3, 8);
    let data = rle_frame(&[&[0x80, 0x02, 0x01, 0x02, 0x03]]);
    let mut out = Vec::new();
    RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut out)
        .unwrap();
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn decode_pads_short_segment() {
    let desc = PixelDataDescriptor::new_monochrome(2, 2, 8);
    let data = rle_frame(&[&[0x00, 0x09]]);
    let mut out = vec![0xEE];
    RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut out)
        .unwrap();
    // decoded samples are appended
    assert_eq!(out, vec![0xEE, 9, 0, 0, 0]);
}

#[test]
fn decode_16_bit_puts_msb_segment_high() {
    let desc = PixelDataDescriptor::new_monochrome(1, 2, 16);
    // MSB segment first, then LSB segment
    let data = rle_frame(&[&[0x01, 0x12, 0x56], &[0x01, 0x34, 0x78]]);
    let mut out = Vec::new();
    RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut out)
        .unwrap();
    assert_eq!(out, vec![0x34, 0x12, 0x78, 0x56]);
}

#[test]
fn decode_rejects_segment_count_mismatch() {
    let desc = PixelDataDescriptor::new_monochrome(1, 3, 16);
    let data = rle_frame(&[&[0x02, 0x01, 0x02, 0x03]]);
    assert!(RleLosslessAdapter
        .decode_frame(&data, &desc, 0, &mut Vec::new())
        .is_err());
}

#[test]
fn encode_then_decode_color() {
    for planar_configuration in 0..=1 {
        let desc = rgb16(3, 5, planar_configuration);
        let raw: Vec<u8> = (0..desc.bytes_per_frame())
            .map(|i| if i % 7 < 3 { 0x40 } else { (i * 31 % 251) as u8 })
            .collect();

        let mut encoded = Vec::new();
        RleLosslessAdapter
            .encode_frame(&raw, &desc, 0, &EncodeOptions::new(), &mut encoded)
            .unwrap();
        assert_eq!(encoded[0], 6);
        assert_eq!(encoded.len() % 2, 0);

        let mut decoded = Vec::new();
        RleLosslessAdapter
            .decode_frame(&encoded, &desc, 0, &mut decoded)
            .unwrap();
        assert_eq!(decoded, raw);
    }
}

#[test]
fn encode_selects_frame() {
    let mut desc = PixelDataDescriptor::new_monochrome(2, 2, 8);
    desc.number_of_frames = 2;
    let raw = [1, 1, 1, 1, 2, 3, 4, 5];

    let mut encoded = Vec::new();
    RleLosslessAdapter
        .encode_frame(&raw, &desc, 1, &EncodeOptions::new(), &mut encoded)
        .unwrap();
    let mut decoded = Vec::new();
    RleLosslessAdapter
        .decode_frame(&encoded, &desc, 1, &mut decoded)
        .unwrap();
    assert_eq!(decoded, vec![2, 3, 4, 5]);

    assert!(RleLosslessAdapter
        .encode_frame(&raw, &desc, 2, &EncodeOptions::new(), &mut Vec::new())
        .is_err());
}

#[test]
fn registry_dispatches_to_rle() {
    let registry = TransferSyntaxRegistry::with_defaults();
    let desc = PixelDataDescriptor::new_monochrome(1, 3, 8);

    let encoded = registry
        .encode_frame(uids::RLE_LOSSLESS, &[4, 4, 4], &desc, 0, &EncodeOptions::new())
        .unwrap();
    let decoded = registry
        .decode_frame(uids::RLE_LOSSLESS, &encoded, &desc, 0)
        .unwrap();
    assert_eq!(decoded, vec![4, 4, 4]);

    let err = registry
        .decode_frame(uids::RLE_LOSSLESS, &[0; 10], &desc, 0)
        .unwrap_err();
    assert!(matches!(err, Error::DecodeFrame { frame: 0, .. }));
}
