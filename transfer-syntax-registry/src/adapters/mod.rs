//! Pixel data adapters built into this crate.
//!
//! - [`rle_lossless`] decodes and encodes RLE Lossless
//!   (requires the `rle` feature, enabled by default).
//! - [`external`] plugs an [`ImageCodec`](dcmkit_encoding::ImageCodec)
//!   implemented elsewhere into the registry.

pub mod external;
#[cfg(feature = "rle")]
pub mod rle_lossless;
