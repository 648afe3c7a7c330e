//! DICOM transcoder API
//!
//! This module collects the pieces necessary
//! to convert a data set from one transfer syntax to another.
//!
//! Native transfer syntaxes are converted into one another
//! by swapping the bytes of every multi-byte number
//! when the byte order changes.
//! Encapsulated pixel data is decoded frame by frame
//! with the decoders found in the [`TransferSyntaxRegistry`]
//! given to the [`Transcoder`].
//! Encoding into an encapsulated transfer syntax is not supported.
use dcmkit_core::header::{HasLength, Header, UndefinedLengthError};
use dcmkit_core::{DataElement, DataSet, SequenceItem, Tag, Value, VR};
use dcmkit_encoding::transfer_syntax::trim_uid;
use dcmkit_encoding::TransferSyntax;
use dcmkit_object::DicomFile;
use dcmkit_parser::{parse_dataset, write_dataset_to_vec, ParseOptions};
use dcmkit_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use tracing::{debug, warn};

use crate::attribute::{self, GetAttributeError};
use crate::encapsulation::{EncapsulatedPixelData, EncapsulationError};

/// An error occurred during the transcoding process.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Unsupported source transfer syntax {}", uid))]
    UnsupportedSource { uid: String, backtrace: Backtrace },

    #[snafu(display("Unsupported target transfer syntax {}", uid))]
    UnsupportedTarget { uid: String, backtrace: Backtrace },

    #[snafu(display("No compatible transfer syntax to convert {} into", uid))]
    NoCompatibleSyntax { uid: String, backtrace: Backtrace },

    #[snafu(display("Lossy transfer syntax {} is not allowed", uid))]
    LossyNotAllowed { uid: String, backtrace: Backtrace },

    #[snafu(display("No decoder registered for transfer syntax {}", uid))]
    NoDecoder { uid: String, backtrace: Backtrace },

    #[snafu(display("Could not parse the source data set"))]
    ParseSource {
        #[snafu(backtrace)]
        source: dcmkit_parser::ReadError,
    },

    #[snafu(display("Could not write the target data set"))]
    WriteTarget {
        #[snafu(backtrace)]
        source: dcmkit_parser::WriteError,
    },

    #[snafu(display("Could not read pixel data attributes"))]
    PixelDataAttributes {
        #[snafu(backtrace)]
        source: GetAttributeError,
    },

    #[snafu(display("Could not extract encapsulated pixel data"))]
    ExtractFrame {
        #[snafu(backtrace)]
        source: EncapsulationError,
    },

    #[snafu(display("Could not decode pixel data"))]
    DecodePixelData {
        source: dcmkit_transfer_syntax_registry::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Decoded frame #{} has {} bytes instead of {}",
        frame,
        actual,
        expected
    ))]
    FidelityLost {
        frame: u32,
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not rebuild a data element"))]
    RebuildElement {
        #[snafu(backtrace)]
        source: UndefinedLengthError,
    },
}

/// Alias for the result of transcoding a DICOM object.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The rules which a transcoder follows
/// when choosing and converting into a target transfer syntax.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TranscodePolicy {
    /// Transfer syntax UIDs to try first, in order of preference.
    pub preferred: Vec<String>,
    /// Whether lossy transfer syntaxes may be chosen as target.
    pub allow_lossy: bool,
    /// Whether decoded frames must have exactly the expected size.
    pub require_fidelity: bool,
}

impl TranscodePolicy {
    /// Create the default policy:
    /// no preferred syntaxes, lossless targets only,
    /// and decoded frames are padded or cut to size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transfer syntax to the end of the preferred list.
    pub fn prefer(mut self, uid: impl Into<String>) -> Self {
        self.preferred.push(uid.into());
        self
    }

    /// Define whether lossy target syntaxes are allowed.
    pub fn allow_lossy(mut self, allow_lossy: bool) -> Self {
        self.allow_lossy = allow_lossy;
        self
    }

    /// Define whether decoded frames of the wrong size are an error.
    pub fn require_fidelity(mut self, require_fidelity: bool) -> Self {
        self.require_fidelity = require_fidelity;
        self
    }
}

/// Converter of data sets between transfer syntaxes,
/// backed by a registry of pixel data codecs.
#[derive(Debug, Clone)]
pub struct Transcoder<'r> {
    registry: &'r TransferSyntaxRegistry,
    policy: TranscodePolicy,
}

impl<'r> Transcoder<'r> {
    /// Create a transcoder with the default policy.
    pub fn new(registry: &'r TransferSyntaxRegistry) -> Self {
        Transcoder::with_policy(registry, TranscodePolicy::default())
    }

    /// Create a transcoder with the given policy.
    pub fn with_policy(registry: &'r TransferSyntaxRegistry, policy: TranscodePolicy) -> Self {
        Transcoder { registry, policy }
    }

    /// The policy of this transcoder.
    pub fn policy(&self) -> &TranscodePolicy {
        &self.policy
    }

    /// The codec registry of this transcoder.
    pub fn registry(&self) -> &'r TransferSyntaxRegistry {
        self.registry
    }

    /// Check whether data in the `source` transfer syntax
    /// can be converted to the `target` transfer syntax.
    ///
    /// Native syntaxes convert into one another,
    /// and an encapsulated syntax converts into a native one
    /// if a decoder is registered for it.
    pub fn can_transcode(&self, source: &TransferSyntax, target: &TransferSyntax) -> bool {
        if source.same_as(target) {
            return true;
        }
        match (source.is_encapsulated(), target.is_encapsulated()) {
            (false, false) => true,
            (true, false) => self.registry.decoder(source.uid()).is_some(),
            _ => false,
        }
    }

    /// Choose the transfer syntax to convert `source` into,
    /// among the `accepted` transfer syntax UIDs.
    ///
    /// The preferred syntaxes of the policy are tried first,
    /// then the accepted syntaxes in their own order.
    /// A candidate must be accepted, reachable from `source`,
    /// and lossless unless lossy syntaxes are allowed
    /// or it is the source syntax itself.
    pub fn select_target_syntax(
        &self,
        source: &TransferSyntax,
        accepted: &[&str],
    ) -> Result<&'static TransferSyntax> {
        let is_accepted = |ts: &TransferSyntax| accepted.iter().any(|uid| trim_uid(uid) == ts.uid());

        let selected = self
            .policy
            .preferred
            .iter()
            .map(String::as_str)
            .chain(accepted.iter().copied())
            .filter_map(|uid| self.registry.transfer_syntax(uid))
            .find(|ts| {
                is_accepted(ts)
                    && self.can_transcode(source, ts)
                    && (self.policy.allow_lossy || !ts.is_lossy() || ts.same_as(source))
            })
            .context(NoCompatibleSyntaxSnafu { uid: source.uid() })?;

        debug!(
            "Selected transfer syntax {} for {}",
            selected.name(),
            source.name()
        );
        Ok(selected)
    }

    /// Convert a data set encoded in `source` into one encoded in `target`.
    ///
    /// The bytes are copied as is if both syntaxes are the same.
    pub fn transcode(
        &self,
        bytes: &[u8],
        source: &TransferSyntax,
        target: &TransferSyntax,
    ) -> Result<Vec<u8>> {
        if source.same_as(target) {
            return Ok(bytes.to_vec());
        }
        self.check(source, target)?;

        let parsed = parse_dataset(bytes, source, ParseOptions::new()).context(ParseSourceSnafu)?;
        let dataset = self.convert(&parsed.dataset, source, target)?;
        write_dataset_to_vec(&dataset, target).context(WriteTargetSnafu)
    }

    /// Convert an in-memory data set read in `source`
    /// into a data set ready to be written in `target`.
    ///
    /// Encapsulated pixel data is decoded
    /// and the byte order of all binary values is adjusted.
    /// Other elements are kept as they are,
    /// including _Lossy Image Compression_.
    pub fn transcode_dataset(
        &self,
        obj: &DataSet,
        source: &TransferSyntax,
        target: &TransferSyntax,
    ) -> Result<DataSet> {
        if source.same_as(target) {
            return Ok(obj.clone());
        }
        self.check(source, target)?;
        self.convert(obj, source, target)
    }

    /// Convert a DICOM file into the `target` transfer syntax,
    /// updating the transfer syntax of its file meta group.
    pub fn transcode_file(&self, file: &DicomFile, target: &TransferSyntax) -> Result<DicomFile> {
        let uid = file.meta().transfer_syntax();
        let source = self
            .registry
            .transfer_syntax(uid)
            .context(UnsupportedSourceSnafu { uid })?;

        let dataset = self.transcode_dataset(file.dataset(), source, target)?;
        let mut meta = file.meta().clone();
        meta.set_transfer_syntax(target.uid());
        Ok(DicomFile::new(meta, dataset))
    }

    fn check(&self, source: &TransferSyntax, target: &TransferSyntax) -> Result<()> {
        ensure!(
            self.registry.transfer_syntax(source.uid()).is_some(),
            UnsupportedSourceSnafu { uid: source.uid() }
        );
        ensure!(
            self.registry.transfer_syntax(target.uid()).is_some(),
            UnsupportedTargetSnafu { uid: target.uid() }
        );
        ensure!(
            self.policy.allow_lossy || !target.is_lossy(),
            LossyNotAllowedSnafu { uid: target.uid() }
        );
        ensure!(
            !target.is_encapsulated(),
            UnsupportedTargetSnafu { uid: target.uid() }
        );
        if source.is_encapsulated() {
            ensure!(
                self.registry.decoder(source.uid()).is_some(),
                NoDecoderSnafu { uid: source.uid() }
            );
        }
        Ok(())
    }

    fn convert(
        &self,
        obj: &DataSet,
        source: &TransferSyntax,
        target: &TransferSyntax,
    ) -> Result<DataSet> {
        debug!("Transcoding from {} to {}", source.name(), target.name());
        let mut out = obj.clone();

        if source.is_encapsulated() {
            if let Some(pixel_data) = self.decode_pixel_data(obj, source)? {
                out.put(pixel_data);
            }
        }

        if out.byte_order() != target.endianness() {
            debug!(
                "Swapping byte order from {:?} to {:?}",
                out.byte_order(),
                target.endianness()
            );
            let elements = out.iter().map(swap_element).collect::<Result<Vec<_>>>()?;
            out = DataSet::from_elements(target.endianness(), elements);
        }
        Ok(out)
    }

    /// Decode the encapsulated pixel data of a data set, if any,
    /// into a native _Pixel Data_ element.
    fn decode_pixel_data(
        &self,
        obj: &DataSet,
        source: &TransferSyntax,
    ) -> Result<Option<DataElement>> {
        let fragments = match obj.get(Tag::PIXEL_DATA).and_then(|e| e.value().fragments()) {
            Some(fragments) => fragments,
            None => return Ok(None),
        };
        let descriptor = attribute::pixel_data_descriptor(obj).context(PixelDataAttributesSnafu)?;
        let encapsulated = EncapsulatedPixelData::new(fragments, &descriptor);
        let expected = descriptor.bytes_per_frame();

        let mut data = Vec::with_capacity(descriptor.total_bytes());
        for frame in 0..descriptor.number_of_frames {
            let compressed = encapsulated.frame_data(frame).context(ExtractFrameSnafu)?;
            let mut decoded = self
                .registry
                .decode_frame(source.uid(), &compressed, &descriptor, frame)
                .context(DecodePixelDataSnafu)?;

            if decoded.len() != expected {
                ensure!(
                    !self.policy.require_fidelity,
                    FidelityLostSnafu {
                        frame,
                        expected,
                        actual: decoded.len(),
                    }
                );
                warn!(
                    "Decoded frame #{} has {} bytes instead of {}, resizing",
                    frame,
                    decoded.len(),
                    expected
                );
                decoded.resize(expected, 0);
            }
            data.extend_from_slice(&decoded);
        }
        debug!(
            "Decoded {} frame(s) of {}",
            descriptor.number_of_frames,
            source.name()
        );

        let vr = if descriptor.bits_allocated > 8 {
            VR::OW
        } else {
            VR::OB
        };
        Ok(Some(DataElement::new(Tag::PIXEL_DATA, vr, data)))
    }
}

/// Reverse the bytes of each `width`-byte number in `bytes`.
pub(crate) fn swap_bytes(bytes: &mut [u8], width: usize) {
    for number in bytes.chunks_exact_mut(width) {
        number.reverse();
    }
}

fn swap_element(element: &DataElement) -> Result<DataElement> {
    match element.value() {
        Value::Primitive(bytes) => match element.vr().numeric_width() {
            Some(width) => {
                let mut bytes = bytes.clone();
                swap_bytes(&mut bytes, width);
                Ok(DataElement::new(element.tag(), element.vr(), bytes))
            }
            None => Ok(element.clone()),
        },
        Value::Sequence(items) => {
            let items = items.iter().map(swap_item).collect::<Result<Vec<_>>>()?;
            DataElement::new_with_len(
                element.tag(),
                element.vr(),
                element.length(),
                Value::Sequence(items),
            )
            .context(RebuildElementSnafu)
        }
        Value::PixelSequence(_) => Ok(element.clone()),
    }
}

fn swap_item(item: &SequenceItem) -> Result<SequenceItem> {
    item.iter().map(swap_element).collect()
}
