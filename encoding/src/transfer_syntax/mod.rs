//! Module containing the concept of a DICOM transfer syntax specifier.
//!
//! A transfer syntax specifier describes how a data set is encoded:
//! the byte order of its binary values,
//! whether value representations are explicit,
//! whether the whole data set is deflated,
//! and whether pixel data is encapsulated (compressed).
//!
//! The set of transfer syntaxes known to the toolkit is closed:
//! see [`entries`] for the full list and [`lookup`] to find one by UID.
//! Codecs for encapsulated pixel data are provided separately,
//! by the transfer syntax registry.

use byteordered::Endianness;
use std::fmt;

pub mod entries;

/// A DICOM transfer syntax specifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: &'static str,
    /// The name of the transfer syntax.
    name: &'static str,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// Whether pixel data is encapsulated in fragments.
    encapsulated: bool,
    /// Whether the data set is compressed with deflate.
    deflated: bool,
    /// Whether the pixel data compression may lose information.
    lossy: bool,
}

/// Trait for a container/repository of transfer syntax specifiers.
///
/// Types implementing this trait can be used
/// to look up transfer syntaxes by UID.
pub trait TransferSyntaxIndex {
    /// Obtain a DICOM transfer syntax by its respective UID.
    ///
    /// Implementations of this method should be robust
    /// to the possible presence of a trailing null character (`\0`)
    /// in `uid`.
    fn get(&self, uid: &str) -> Option<&TransferSyntax>;
}

impl<T: ?Sized> TransferSyntaxIndex for &T
where
    T: TransferSyntaxIndex,
{
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        (**self).get(uid)
    }
}

/// Remove the padding (trailing null characters or spaces) from a UID.
pub fn trim_uid(uid: &str) -> &str {
    uid.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
}

/// Look up one of the well-known transfer syntaxes by UID.
///
/// Trailing padding in `uid` is ignored.
///
/// ```
/// # use dcmkit_encoding::transfer_syntax::lookup;
/// let ts = lookup("1.2.840.10008.1.2.1\0").unwrap();
/// assert_eq!(ts.name(), "Explicit VR Little Endian");
/// assert!(lookup("1.2.3.4").is_none());
/// ```
pub fn lookup(uid: &str) -> Option<&'static TransferSyntax> {
    let uid = trim_uid(uid);
    entries::ALL.iter().copied().find(|ts| ts.uid == uid)
}

/// The index of the well-known transfer syntaxes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct KnownTransferSyntaxes;

impl TransferSyntaxIndex for KnownTransferSyntaxes {
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        lookup(uid)
    }
}

impl TransferSyntax {
    /// Create a transfer syntax with native (not encapsulated) pixel data.
    pub const fn new_native(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            encapsulated: false,
            deflated: false,
            lossy: false,
        }
    }

    /// Create a deflated explicit VR little endian transfer syntax.
    pub const fn new_deflated(uid: &'static str, name: &'static str) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order: Endianness::Little,
            explicit_vr: true,
            encapsulated: false,
            deflated: true,
            lossy: false,
        }
    }

    /// Create an explicit VR little endian transfer syntax
    /// with encapsulated pixel data.
    pub const fn new_encapsulated(uid: &'static str, name: &'static str, lossy: bool) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order: Endianness::Little,
            explicit_vr: true,
            encapsulated: true,
            deflated: false,
            lossy,
        }
    }

    /// Obtain this transfer syntax' unique identifier.
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    /// Obtain the name of this transfer syntax.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Obtain this transfer syntax' expected endianness.
    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    /// Check whether this transfer syntax mandates an explicit VR.
    pub const fn explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Check whether pixel data is encapsulated (compressed).
    pub const fn is_encapsulated(&self) -> bool {
        self.encapsulated
    }

    /// Check whether pixel data is native (uncompressed).
    pub const fn is_uncompressed(&self) -> bool {
        !self.encapsulated
    }

    /// Check whether the data set is deflated.
    pub const fn is_deflated(&self) -> bool {
        self.deflated
    }

    /// Check whether encoding pixel data in this transfer syntax
    /// may lose information.
    pub const fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Check whether this is the same transfer syntax as `other`,
    /// comparing the UIDs.
    pub fn same_as(&self, other: &TransferSyntax) -> bool {
        self.uid == other.uid
    }
}

impl fmt::Display for TransferSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::uids;

    #[test]
    fn lookup_strips_padding() {
        let ts = lookup("1.2.840.10008.1.2\0").unwrap();
        assert_eq!(ts.uid(), uids::IMPLICIT_VR_LITTLE_ENDIAN);
        assert!(!ts.explicit_vr());
        let ts = lookup("1.2.840.10008.1.2.2 ").unwrap();
        assert_eq!(ts.endianness(), Endianness::Big);
        assert!(KnownTransferSyntaxes.get(uids::RLE_LOSSLESS).is_some());
    }

    #[test]
    fn every_known_uid_is_registered() {
        for uid in [
            uids::IMPLICIT_VR_LITTLE_ENDIAN,
            uids::EXPLICIT_VR_LITTLE_ENDIAN,
            uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
            uids::EXPLICIT_VR_BIG_ENDIAN,
            uids::RLE_LOSSLESS,
            uids::JPEG_BASELINE8_BIT,
            uids::JPEG_EXTENDED12_BIT,
            uids::JPEG_LOSSLESS,
            uids::JPEG_LOSSLESS_SV1,
            uids::JPEG2000_LOSSLESS,
            uids::JPEG2000,
        ] {
            let ts = lookup(uid).unwrap();
            assert_eq!(ts.uid(), uid);
        }
    }

    #[test]
    fn flags() {
        assert!(entries::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN.is_deflated());
        assert!(entries::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN.is_uncompressed());
        assert!(entries::RLE_LOSSLESS.is_encapsulated());
        assert!(!entries::RLE_LOSSLESS.is_lossy());
        assert!(entries::JPEG_BASELINE.is_lossy());
        assert!(!entries::JPEG_LOSSLESS_SV1.is_lossy());
        assert!(entries::JPEG_2000.is_lossy());
    }
}
