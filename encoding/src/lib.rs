#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

//! DICOM encoding and decoding primitives.
//!
//! This crate provides the [transfer syntax specifier],
//! which describes how a data set is encoded,
//! the low-level decoders and encoders of element and item headers
//! for every supported combination of VR explicitness and byte order,
//! and the [pixel data adapter] interfaces
//! implemented by codecs of encapsulated pixel data.
//!
//! [transfer syntax specifier]: ./transfer_syntax/index.html
//! [pixel data adapter]: ./adapters/index.html

pub mod adapters;
pub mod decode;
pub mod encode;
pub mod transfer_syntax;

pub use adapters::{
    DecodeError, EncodeError, EncodeOptions, ImageCodec, PhotometricInterpretation,
    PixelDataDescriptor, PixelDataReader, PixelDataWriter,
};
pub use byteordered::Endianness;
pub use decode::HeaderDecoder;
pub use encode::HeaderEncoder;
pub use transfer_syntax::{TransferSyntax, TransferSyntaxIndex};

// re-export dependencies that are part of the public API
pub use snafu;
