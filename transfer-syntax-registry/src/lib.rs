#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! This crate contains the registry of transfer syntaxes
//! and of the pixel data codecs that go with them.
//!
//! Unlike a global plugin table,
//! a [`TransferSyntaxRegistry`] is an ordinary value:
//! build it once at start-up,
//! register any external codecs,
//! and then pass it by reference to whatever needs to decode
//! or encode pixel data.
//! Once built, it is only read, so it can be shared across threads.
//!
//! ```
//! use dcmkit_transfer_syntax_registry::TransferSyntaxRegistry;
//! # use dcmkit_core::uids;
//!
//! let registry = TransferSyntaxRegistry::with_defaults();
//! assert!(registry.transfer_syntax(uids::JPEG_BASELINE8_BIT).is_some());
//! // JPEG is known but has no codec until one is registered
//! assert!(registry.decoder(uids::JPEG_BASELINE8_BIT).is_none());
//! # #[cfg(feature = "rle")]
//! assert!(registry.decoder(uids::RLE_LOSSLESS).is_some());
//! ```

use dcmkit_encoding::adapters::{
    DecodeError, DynPixelDataReader, DynPixelDataWriter, EncodeError, EncodeOptions, ImageCodec,
    PixelDataDescriptor, PixelDataReader, PixelDataWriter,
};
use dcmkit_encoding::transfer_syntax::{trim_uid, TransferSyntax, TransferSyntaxIndex};
use snafu::{OptionExt, ResultExt, Snafu};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod adapters;

pub use dcmkit_encoding::transfer_syntax::entries;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Unknown transfer syntax {}", uid))]
    UnknownTransferSyntax { uid: String },
    #[snafu(display("Transfer syntax {} does not encapsulate pixel data", uid))]
    NotEncapsulated { uid: &'static str },
    #[snafu(display("No decoder registered for transfer syntax {}", uid))]
    MissingDecoder { uid: &'static str },
    #[snafu(display("No encoder registered for transfer syntax {}", uid))]
    MissingEncoder { uid: &'static str },
    #[snafu(display("Could not decode frame #{} in {}", frame, uid))]
    DecodeFrame {
        uid: &'static str,
        frame: u32,
        source: DecodeError,
    },
    #[snafu(display("Could not encode frame #{} in {}", frame, uid))]
    EncodeFrame {
        uid: &'static str,
        frame: u32,
        source: EncodeError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A transfer syntax and the codecs registered for it.
struct CodecEntry {
    ts: &'static TransferSyntax,
    decoder: Option<DynPixelDataReader>,
    encoder: Option<DynPixelDataWriter>,
}

/// Data type for a registry of DICOM transfer syntaxes and pixel data codecs.
pub struct TransferSyntaxRegistry {
    m: HashMap<&'static str, CodecEntry>,
}

impl fmt::Debug for TransferSyntaxRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: HashMap<&str, (&str, bool, bool)> = self
            .m
            .iter()
            .map(|(uid, e)| {
                (
                    *uid,
                    (e.ts.name(), e.decoder.is_some(), e.encoder.is_some()),
                )
            })
            .collect();
        f.debug_struct("TransferSyntaxRegistry")
            .field("m", &entries)
            .finish()
    }
}

impl Default for TransferSyntaxRegistry {
    fn default() -> Self {
        TransferSyntaxRegistry::with_defaults()
    }
}

impl TransferSyntaxRegistry {
    /// Create a registry with all well-known transfer syntaxes
    /// and no pixel data codecs.
    pub fn new() -> Self {
        let mut registry = TransferSyntaxRegistry { m: HashMap::new() };
        for ts in entries::ALL.iter().copied() {
            registry.register(ts);
        }
        registry
    }

    /// Create a registry with all well-known transfer syntaxes
    /// and the codecs built into this crate.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = TransferSyntaxRegistry::new();
        #[cfg(feature = "rle")]
        {
            use adapters::rle_lossless::RleLosslessAdapter;
            if let Some(entry) = registry.m.get_mut(entries::RLE_LOSSLESS.uid()) {
                entry.decoder = Some(Box::new(RleLosslessAdapter));
                entry.encoder = Some(Box::new(RleLosslessAdapter));
            }
        }
        registry
    }

    /// Register a transfer syntax without codecs.
    /// A transfer syntax with the same UID is replaced,
    /// along with its codecs.
    pub fn register(&mut self, ts: &'static TransferSyntax) {
        self.m.insert(
            ts.uid(),
            CodecEntry {
                ts,
                decoder: None,
                encoder: None,
            },
        );
    }

    fn entry_mut(&mut self, uid: &str) -> Result<&mut CodecEntry> {
        let uid = trim_uid(uid);
        let entry = self
            .m
            .get_mut(uid)
            .context(UnknownTransferSyntaxSnafu { uid })?;
        snafu::ensure!(
            entry.ts.is_encapsulated(),
            NotEncapsulatedSnafu { uid: entry.ts.uid() }
        );
        Ok(entry)
    }

    /// Register the pixel data decoder of an encapsulated transfer syntax,
    /// replacing any previous one.
    pub fn register_decoder(&mut self, uid: &str, decoder: DynPixelDataReader) -> Result<()> {
        self.entry_mut(uid)?.decoder = Some(decoder);
        Ok(())
    }

    /// Register the pixel data encoder of an encapsulated transfer syntax,
    /// replacing any previous one.
    pub fn register_encoder(&mut self, uid: &str, encoder: DynPixelDataWriter) -> Result<()> {
        self.entry_mut(uid)?.encoder = Some(encoder);
        Ok(())
    }

    /// Register an external image codec
    /// as both decoder and encoder of the given transfer syntaxes.
    pub fn register_external(
        &mut self,
        uids: &[&str],
        codec: Arc<dyn ImageCodec + Send + Sync>,
    ) -> Result<()> {
        for uid in uids {
            let adapter = adapters::external::ExternalCodecAdapter::new(Arc::clone(&codec));
            let entry = self.entry_mut(uid)?;
            entry.decoder = Some(Box::new(adapter.clone()));
            entry.encoder = Some(Box::new(adapter));
        }
        Ok(())
    }

    /// Obtain a transfer syntax by UID.
    pub fn transfer_syntax(&self, uid: &str) -> Option<&'static TransferSyntax> {
        self.m.get(trim_uid(uid)).map(|e| e.ts)
    }

    /// Obtain the pixel data decoder of a transfer syntax, if any.
    pub fn decoder(&self, uid: &str) -> Option<&(dyn PixelDataReader + Send + Sync)> {
        self.m.get(trim_uid(uid)).and_then(|e| e.decoder.as_deref())
    }

    /// Obtain the pixel data encoder of a transfer syntax, if any.
    pub fn encoder(&self, uid: &str) -> Option<&(dyn PixelDataWriter + Send + Sync)> {
        self.m.get(trim_uid(uid)).and_then(|e| e.encoder.as_deref())
    }

    /// Decode one frame of encapsulated pixel data
    /// with the decoder registered for `uid`.
    pub fn decode_frame(
        &self,
        uid: &str,
        data: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
    ) -> Result<Vec<u8>> {
        let ts = self
            .transfer_syntax(uid)
            .context(UnknownTransferSyntaxSnafu { uid })?;
        let decoder = self
            .decoder(uid)
            .context(MissingDecoderSnafu { uid: ts.uid() })?;
        let mut out = Vec::with_capacity(descriptor.bytes_per_frame());
        decoder
            .decode_frame(data, descriptor, frame, &mut out)
            .context(DecodeFrameSnafu {
                uid: ts.uid(),
                frame,
            })?;
        Ok(out)
    }

    /// Encode one frame of native pixel data
    /// with the encoder registered for `uid`.
    pub fn encode_frame(
        &self,
        uid: &str,
        raw: &[u8],
        descriptor: &PixelDataDescriptor,
        frame: u32,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let ts = self
            .transfer_syntax(uid)
            .context(UnknownTransferSyntaxSnafu { uid })?;
        let encoder = self
            .encoder(uid)
            .context(MissingEncoderSnafu { uid: ts.uid() })?;
        let mut out = Vec::new();
        encoder
            .encode_frame(raw, descriptor, frame, options, &mut out)
            .context(EncodeFrameSnafu {
                uid: ts.uid(),
                frame,
            })?;
        Ok(out)
    }

    /// Iterate over all registered transfer syntaxes.
    pub fn iter(&self) -> impl Iterator<Item = &'static TransferSyntax> + '_ {
        self.m.values().map(|e| e.ts)
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistry {
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        self.transfer_syntax(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::uids;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_is_send_and_sync() {
        assert_send_sync::<TransferSyntaxRegistry>();
    }

    #[test]
    fn all_known_syntaxes_are_registered() {
        let registry = TransferSyntaxRegistry::new();
        assert_eq!(registry.iter().count(), entries::ALL.len());
        let ts = registry.transfer_syntax("1.2.840.10008.1.2.1\0").unwrap();
        assert_eq!(ts.uid(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
        assert!(registry.get(uids::JPEG2000).is_some());
        assert!(registry.transfer_syntax("1.2.3.4").is_none());
    }

    #[cfg(feature = "rle")]
    #[test]
    fn codecs_only_for_encapsulated_syntaxes() {
        let mut registry = TransferSyntaxRegistry::new();
        let err = registry
            .register_decoder(
                uids::EXPLICIT_VR_LITTLE_ENDIAN,
                Box::new(adapters::rle_lossless::RleLosslessAdapter),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotEncapsulated { .. }));
        let err = registry
            .register_decoder(
                "1.2.3.4",
                Box::new(adapters::rle_lossless::RleLosslessAdapter),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTransferSyntax { .. }));
    }

    #[test]
    fn missing_decoder() {
        let registry = TransferSyntaxRegistry::with_defaults();
        let desc = PixelDataDescriptor::new_monochrome(1, 1, 8);
        let err = registry
            .decode_frame(uids::JPEG_BASELINE8_BIT, &[0xFF, 0xD8], &desc, 0)
            .unwrap_err();
        assert!(matches!(err, Error::MissingDecoder { .. }));
    }
}
