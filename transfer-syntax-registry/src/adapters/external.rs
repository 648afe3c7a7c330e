//! Adapter between an external [`ImageCodec`]
//! and the pixel data reader and writer traits.
use std::fmt;
use std::sync::Arc;

use dcmkit_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, ImageCodec,
    PixelDataDescriptor, PixelDataReader, PixelDataWriter,
};
use dcmkit_encoding::snafu::prelude::*;

/// Pixel data adapter which forwards each frame to an external image codec.
#[derive(Clone)]
pub struct ExternalCodecAdapter {
    codec: Arc<dyn ImageCodec + Send + Sync>,
}

impl fmt::Debug for ExternalCodecAdapter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExternalCodecAdapter").finish_non_exhaustive()
    }
}

impl ExternalCodecAdapter {
    pub fn new(codec: Arc<dyn ImageCodec + Send + Sync>) -> Self {
        ExternalCodecAdapter { codec }
    }
}

impl PixelDataReader for ExternalCodecAdapter {
    fn decode_frame(
        &self,
        data: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        dst: &mut Vec<u8>,
    ) -> DecodeResult<()> {
        ensure!(
            frame < descriptor.number_of_frames,
            decode_error::FrameRangeOutOfBoundsSnafu { frame }
        );
        let decoded = self
            .codec
            .decode(data, descriptor)
            .whatever_context("External codec failed to decode frame")?;
        if decoded.len() != descriptor.bytes_per_frame() {
            whatever!(
                "External codec produced {} bytes, expected {}",
                decoded.len(),
                descriptor.bytes_per_frame()
            );
        }
        dst.extend_from_slice(&decoded);
        Ok(())
    }
}

impl PixelDataWriter for ExternalCodecAdapter {
    fn can_encode(&self, options: &EncodeOptions, descriptor: &PixelDataDescriptor) -> bool {
        self.codec.can_encode(options, descriptor)
    }

    fn encode_frame(
        &self,
        raw: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        options: &EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        if !self.codec.can_encode(options, descriptor) {
            return encode_error::UnsupportedSnafu {
                reason: "rejected by external codec",
            }
            .fail();
        }
        let range = descriptor
            .frame_range(frame)
            .context(encode_error::FrameRangeOutOfBoundsSnafu { frame })?;
        let frame_in = raw
            .get(range)
            .whatever_context("Native pixel data is too short for frame")?;
        let encoded = self
            .codec
            .encode(frame_in, descriptor, options)
            .whatever_context("External codec failed to encode frame")?;
        dst.extend_from_slice(&encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_encoding::adapters::ImageCodecError;

    /// Codec which stores samples inverted.
    struct Invert;

    impl ImageCodec for Invert {
        fn decode(
            &self,
            bytes: &[u8],
            _descriptor: &PixelDataDescriptor,
        ) -> Result<Vec<u8>, ImageCodecError> {
            Ok(bytes.iter().map(|b| !b).collect())
        }

        fn encode(
            &self,
            raw: &[u8],
            _descriptor: &PixelDataDescriptor,
            _options: &EncodeOptions,
        ) -> Result<Vec<u8>, ImageCodecError> {
            Ok(raw.iter().map(|b| !b).collect())
        }

        fn can_encode(&self, options: &EncodeOptions, _descriptor: &PixelDataDescriptor) -> bool {
            options.quality.is_none()
        }
    }

    #[test]
    fn forwards_frames_to_codec() {
        let adapter = ExternalCodecAdapter::new(Arc::new(Invert));
        let mut desc = PixelDataDescriptor::new_monochrome(1, 2, 8);
        desc.number_of_frames = 2;

        let mut encoded = Vec::new();
        adapter
            .encode_frame(&[1, 2, 3, 4], &desc, 1, &EncodeOptions::new(), &mut encoded)
            .unwrap();
        assert_eq!(encoded, vec![!3, !4]);

        let mut decoded = Vec::new();
        adapter.decode_frame(&encoded, &desc, 1, &mut decoded).unwrap();
        assert_eq!(decoded, vec![3, 4]);

        // wrong size from the codec
        assert!(adapter.decode_frame(&[0], &desc, 0, &mut decoded).is_err());
    }

    #[test]
    fn honors_codec_capabilities() {
        let adapter = ExternalCodecAdapter::new(Arc::new(Invert));
        let desc = PixelDataDescriptor::new_monochrome(1, 1, 8);
        let options = EncodeOptions::new().quality(80);
        assert!(!adapter.can_encode(&options, &desc));
        let err = adapter
            .encode_frame(&[0], &desc, 0, &options, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, dcmkit_encoding::EncodeError::Unsupported { .. }));
    }
}
