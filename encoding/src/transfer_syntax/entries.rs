//! A list of the transfer syntaxes known to the toolkit.
//!
//! Only RLE Lossless ships with a built-in pixel data codec.
//! The JPEG family is recognized, so that data sets in those syntaxes
//! can still be read and written without touching the pixel data,
//! and codecs for them can be plugged in through the registry.

use super::TransferSyntax;
use byteordered::Endianness;
use dcmkit_core::uids;

// -- native --

/// **Implicit VR Little Endian**
pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new_native(
    uids::IMPLICIT_VR_LITTLE_ENDIAN,
    "Implicit VR Little Endian",
    Endianness::Little,
    false,
);

/// **Explicit VR Little Endian**
pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new_native(
    uids::EXPLICIT_VR_LITTLE_ENDIAN,
    "Explicit VR Little Endian",
    Endianness::Little,
    true,
);

/// **Explicit VR Big Endian** (retired)
pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax::new_native(
    uids::EXPLICIT_VR_BIG_ENDIAN,
    "Explicit VR Big Endian",
    Endianness::Big,
    true,
);

/// **Deflated Explicit VR Little Endian**
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax::new_deflated(
    uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    "Deflated Explicit VR Little Endian",
);

// -- encapsulated --

/// **RLE Lossless**
pub const RLE_LOSSLESS: TransferSyntax =
    TransferSyntax::new_encapsulated(uids::RLE_LOSSLESS, "RLE Lossless", false);

/// **JPEG Baseline (Process 1)**
pub const JPEG_BASELINE: TransferSyntax =
    TransferSyntax::new_encapsulated(uids::JPEG_BASELINE8_BIT, "JPEG Baseline", true);

/// **JPEG Extended (Process 2 & 4)**
pub const JPEG_EXTENDED: TransferSyntax =
    TransferSyntax::new_encapsulated(uids::JPEG_EXTENDED12_BIT, "JPEG Extended", true);

/// **JPEG Lossless, Non-Hierarchical (Process 14)**
pub const JPEG_LOSSLESS_NON_HIERARCHICAL: TransferSyntax = TransferSyntax::new_encapsulated(
    uids::JPEG_LOSSLESS,
    "JPEG Lossless, Non-Hierarchical",
    false,
);

/// **JPEG Lossless, Non-Hierarchical, First-Order Prediction**
pub const JPEG_LOSSLESS_SV1: TransferSyntax = TransferSyntax::new_encapsulated(
    uids::JPEG_LOSSLESS_SV1,
    "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
    false,
);

/// **JPEG 2000 Image Compression (Lossless Only)**
pub const JPEG_2000_LOSSLESS: TransferSyntax = TransferSyntax::new_encapsulated(
    uids::JPEG2000_LOSSLESS,
    "JPEG 2000 (Lossless Only)",
    false,
);

/// **JPEG 2000 Image Compression**
pub const JPEG_2000: TransferSyntax =
    TransferSyntax::new_encapsulated(uids::JPEG2000, "JPEG 2000", true);

/// All of the transfer syntaxes above.
pub static ALL: &[&TransferSyntax] = &[
    &IMPLICIT_VR_LITTLE_ENDIAN,
    &EXPLICIT_VR_LITTLE_ENDIAN,
    &EXPLICIT_VR_BIG_ENDIAN,
    &DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    &RLE_LOSSLESS,
    &JPEG_BASELINE,
    &JPEG_EXTENDED,
    &JPEG_LOSSLESS_NON_HIERARCHICAL,
    &JPEG_LOSSLESS_SV1,
    &JPEG_2000_LOSSLESS,
    &JPEG_2000,
];
