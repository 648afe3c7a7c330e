//! This module contains the data set parser.
//!
//! The parser walks over an in-memory buffer with a cursor,
//! decoding one element header at a time
//! and descending into sequences and encapsulated pixel data
//! until their end is reached,
//! so that the outcome is an owned tree of elements.
//!
//! Truncated input is tolerated:
//! when an element declares more bytes than are left in the buffer,
//! the element is kept with the bytes available
//! and parsing stops without an error.
//! The same happens when the buffer ends in the middle of a header.
//! In both cases [`ParsedDataSet::truncated`] is set
//! and a warning is logged.
use dcmkit_core::dictionary::{BuiltinVrTable, VrInference};
use dcmkit_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmkit_core::value::{PixelFragmentSequence, Value};
use dcmkit_core::{DataElement, DataSet, Endianness, SequenceItem, Tag, VR};
use dcmkit_encoding::decode::{self, HeaderDecoder};
use dcmkit_encoding::transfer_syntax::TransferSyntax;
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::warn;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The value representation of an element is not recognized.
    #[snafu(display("Invalid value representation {:02X?} in element {}", code, tag))]
    InvalidVr {
        tag: Tag,
        code: [u8; 2],
        backtrace: Backtrace,
    },
    #[snafu(display("Could not read element header at position {}", position))]
    ReadHeader {
        position: usize,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read item header at position {}", position))]
    ReadItemHeader {
        position: usize,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Unsupported transfer syntax {}", uid))]
    UnsupportedTransferSyntax {
        uid: &'static str,
        backtrace: Backtrace,
    },
    /// A tag found where it is not admitted,
    /// such as a regular element among the items of a sequence.
    #[snafu(display("Unexpected tag {} at position {}", tag, position))]
    UnexpectedTag {
        tag: Tag,
        position: usize,
        backtrace: Backtrace,
    },
    /// Undefined length in an element which is neither
    /// a sequence nor encapsulated pixel data.
    #[snafu(display("Undefined length in element {} ({})", tag, vr))]
    UndefinedLength {
        tag: Tag,
        vr: VR,
        backtrace: Backtrace,
    },
    #[cfg(feature = "deflate")]
    #[snafu(display("Could not inflate the data set"))]
    Inflate {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    /// Generic parse failure.
    #[snafu(display("{}", message))]
    Malformed {
        message: String,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The set of options for the data set parser.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
    /// Stop parsing the top-level data set
    /// before the first element with a tag equal or greater than this one.
    pub stop_before: Option<Tag>,
}

impl ParseOptions {
    /// Create the default set of options:
    /// parse the whole buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop parsing the top-level data set before the given tag.
    pub fn stop_before(mut self, tag: Tag) -> Self {
        self.stop_before = Some(tag);
        self
    }
}

/// The outcome of parsing a data set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataSet {
    /// the data elements read
    pub dataset: DataSet,
    /// whether the input ended before the data set did
    pub truncated: bool,
    /// the number of bytes consumed from the (inflated) input
    pub bytes_read: usize,
}

/// Parse a data set encoded with the given transfer syntax,
/// inferring implicit VRs from the built-in attribute table.
pub fn parse_dataset(
    bytes: &[u8],
    ts: &TransferSyntax,
    options: ParseOptions,
) -> Result<ParsedDataSet> {
    parse_dataset_with(bytes, ts, options, &BuiltinVrTable)
}

/// Parse a data set encoded with the given transfer syntax,
/// inferring implicit VRs with `dict`.
pub fn parse_dataset_with(
    bytes: &[u8],
    ts: &TransferSyntax,
    options: ParseOptions,
    dict: &dyn VrInference,
) -> Result<ParsedDataSet> {
    if ts.is_deflated() {
        return parse_deflated(bytes, ts, options, dict);
    }
    DataSetParser::new(bytes, HeaderDecoder::new(ts), dict).parse(options)
}

#[cfg(feature = "deflate")]
fn parse_deflated(
    bytes: &[u8],
    ts: &TransferSyntax,
    options: ParseOptions,
    dict: &dyn VrInference,
) -> Result<ParsedDataSet> {
    let inflated = crate::deflate::inflate(bytes).context(InflateSnafu)?;
    DataSetParser::new(&inflated, HeaderDecoder::new(ts), dict).parse(options)
}

#[cfg(not(feature = "deflate"))]
fn parse_deflated(
    _bytes: &[u8],
    ts: &TransferSyntax,
    _options: ParseOptions,
    _dict: &dyn VrInference,
) -> Result<ParsedDataSet> {
    UnsupportedTransferSyntaxSnafu { uid: ts.uid() }.fail()
}

/// What ends the current run of elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum End {
    /// the end of the buffer
    Buffer,
    /// an absolute position in the buffer
    At(usize),
    /// an item delimiter
    ItemDelimiter,
}

struct DataSetParser<'a> {
    bytes: &'a [u8],
    position: usize,
    decoder: HeaderDecoder,
    dict: &'a dyn VrInference,
    truncated: bool,
}

impl<'a> DataSetParser<'a> {
    fn new(bytes: &'a [u8], decoder: HeaderDecoder, dict: &'a dyn VrInference) -> Self {
        DataSetParser {
            bytes,
            position: 0,
            decoder,
            dict,
            truncated: false,
        }
    }

    fn parse(mut self, options: ParseOptions) -> Result<ParsedDataSet> {
        let mut dataset = DataSet::with_byte_order(self.decoder.byte_order());
        while self.position < self.bytes.len() && !self.truncated {
            if let (Some(stop), Some(tag)) = (options.stop_before, self.peek_tag(self.decoder)) {
                if tag >= stop {
                    break;
                }
            }
            if let Some(element) = self.read_element(self.decoder)? {
                dataset.put(element);
            }
        }
        Ok(ParsedDataSet {
            dataset,
            truncated: self.truncated,
            bytes_read: self.position,
        })
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position.min(self.bytes.len())..]
    }

    fn peek_tag(&self, decoder: HeaderDecoder) -> Option<Tag> {
        decoder.decode_tag(self.remaining())
    }

    fn mark_truncated(&mut self, what: &str) {
        if !self.truncated {
            warn!(
                "Data set truncated at position {} while reading {}",
                self.position, what
            );
        }
        self.truncated = true;
    }

    /// Read one element.
    /// Returns `None` when the buffer ends before the element header does,
    /// or when a stray delimiter was skipped.
    fn read_element(&mut self, decoder: HeaderDecoder) -> Result<Option<DataElement>> {
        let position = self.position;
        let decoded = decoder
            .decode_header(self.remaining(), self.dict)
            .map_err(|e| match e {
                decode::Error::InvalidVr { tag, code, .. } => InvalidVrSnafu { tag, code }.build(),
                e => Error::ReadHeader {
                    position,
                    source: e,
                },
            })?;
        let (header, header_len) = match decoded {
            Some(h) => h,
            None => {
                self.mark_truncated("an element header");
                return Ok(None);
            }
        };
        self.position += header_len;

        let tag = header.tag;
        if tag == Tag::ITEM_DELIMITER || tag == Tag::SEQUENCE_DELIMITER {
            warn!("Skipping stray delimiter {} at position {}", tag, position);
            return Ok(None);
        }
        if tag == Tag::ITEM {
            return UnexpectedTagSnafu { tag, position }.fail();
        }

        if header.vr == VR::SQ {
            return self.read_sequence(decoder, header).map(Some);
        }
        if header.len.is_undefined() {
            if tag == Tag::PIXEL_DATA {
                return self.read_pixel_sequence(decoder, header).map(Some);
            }
            if header.vr == VR::UN {
                // unknown content of undefined length is a sequence
                // in implicit VR little endian
                let implicit = HeaderDecoder::with_properties(Endianness::Little, false);
                let header = DataElementHeader::new(tag, VR::SQ, header.len);
                return self.read_sequence(implicit, header).map(Some);
            }
            return UndefinedLengthSnafu { tag, vr: header.vr }.fail();
        }

        let len = header.len.0 as usize;
        let available = self.remaining();
        let value = if available.len() < len {
            self.mark_truncated("an element value");
            available.to_vec()
        } else {
            available[..len].to_vec()
        };
        self.position += value.len();
        let len = Length(value.len() as u32);
        DataElement::new_with_len(tag, header.vr, len, Value::Primitive(value))
            .map(Some)
            .map_err(|e| {
                MalformedSnafu {
                    message: e.to_string(),
                }
                .build()
            })
    }

    fn read_sequence(
        &mut self,
        decoder: HeaderDecoder,
        header: DataElementHeader,
    ) -> Result<DataElement> {
        let start = self.position;
        let end = match header.len.get() {
            Some(len) => End::At(start + len as usize),
            None => End::Buffer,
        };
        let mut items = Vec::new();
        let mut delimited = false;

        while !self.truncated && !self.reached(end) {
            let position = self.position;
            let item_header = match decoder
                .decode_item_header(self.remaining())
                .context(ReadItemHeaderSnafu { position })?
            {
                Some((h, n)) => {
                    self.position += n;
                    h
                }
                None => {
                    self.mark_truncated("an item header");
                    break;
                }
            };

            match item_header {
                SequenceItemHeader::Item { len } => {
                    let item_end = match len.get() {
                        Some(len) => End::At(self.position + len as usize),
                        None => End::ItemDelimiter,
                    };
                    items.push(self.read_item(decoder, item_end)?);
                }
                SequenceItemHeader::SequenceDelimiter => {
                    if end != End::Buffer {
                        warn!(
                            "Sequence delimiter in sequence {} of defined length",
                            header.tag
                        );
                    }
                    delimited = true;
                    break;
                }
                SequenceItemHeader::ItemDelimiter => {
                    warn!(
                        "Skipping stray item delimiter in sequence {} at position {}",
                        header.tag, position
                    );
                }
            }
        }
        if end == End::Buffer && !delimited {
            self.mark_truncated("a sequence of undefined length");
        }
        let mut len = header.len;
        if let End::At(end) = end {
            let exhausted = self.truncated || self.position >= self.bytes.len();
            if self.position < end && exhausted {
                // the buffer ran out before the declared length
                self.mark_truncated("a sequence of defined length");
                len = Length((self.position - start) as u32);
            } else if self.position != end {
                warn!(
                    "Sequence {} ended at position {}, expected {}",
                    header.tag, self.position, end
                );
            }
        }

        DataElement::new_with_len(header.tag, VR::SQ, len, Value::Sequence(items)).map_err(
            |e| {
                MalformedSnafu {
                    message: e.to_string(),
                }
                .build()
            },
        )
    }

    fn read_item(&mut self, decoder: HeaderDecoder, end: End) -> Result<SequenceItem> {
        let mut item = SequenceItem::new();
        let mut delimited = false;
        while !self.truncated && !self.reached(end) {
            if end == End::ItemDelimiter && self.peek_tag(decoder) == Some(Tag::ITEM_DELIMITER) {
                let position = self.position;
                match decoder
                    .decode_item_header(self.remaining())
                    .context(ReadItemHeaderSnafu { position })?
                {
                    Some((_, n)) => {
                        self.position += n;
                        delimited = true;
                    }
                    None => self.mark_truncated("an item delimiter"),
                }
                break;
            }
            if let Some(element) = self.read_element(decoder)? {
                item.put(element);
            }
        }
        match end {
            End::ItemDelimiter if !delimited => {
                self.mark_truncated("an item of undefined length");
            }
            End::At(end) if self.position < end => {
                self.mark_truncated("an item of defined length");
            }
            _ => {}
        }
        Ok(item)
    }

    fn read_pixel_sequence(
        &mut self,
        decoder: HeaderDecoder,
        header: DataElementHeader,
    ) -> Result<DataElement> {
        let mut offset_table = None;
        let mut fragments = Vec::new();

        while !self.truncated {
            let position = self.position;
            let item_header = match decoder
                .decode_item_header(self.remaining())
                .context(ReadItemHeaderSnafu { position })?
            {
                Some((h, n)) => {
                    self.position += n;
                    h
                }
                None => {
                    self.mark_truncated("a pixel data item header");
                    break;
                }
            };
            match item_header {
                SequenceItemHeader::Item { len } => {
                    let len = match len.get() {
                        Some(len) => len as usize,
                        None => return UnexpectedTagSnafu { tag: Tag::ITEM, position }.fail(),
                    };
                    let available = self.remaining();
                    let data = if available.len() < len {
                        self.mark_truncated("a pixel data fragment");
                        available
                    } else {
                        &available[..len]
                    };
                    self.position += data.len();
                    if offset_table.is_none() {
                        // the first item is the basic offset table
                        if data.len() % 4 != 0 {
                            warn!(
                                "Basic offset table of {} bytes is not a multiple of 4, ignoring {} trailing bytes",
                                data.len(),
                                data.len() % 4
                            );
                        }
                        offset_table = Some(
                            data.chunks_exact(4)
                                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                                .collect::<Vec<_>>(),
                        );
                    } else {
                        fragments.push(data.to_vec());
                    }
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    return UnexpectedTagSnafu {
                        tag: Tag::ITEM_DELIMITER,
                        position,
                    }
                    .fail()
                }
            }
        }

        let value = Value::PixelSequence(PixelFragmentSequence::new(
            offset_table.unwrap_or_default(),
            fragments,
        ));
        DataElement::new_with_len(header.tag, header.vr, Length::UNDEFINED, value).map_err(|e| {
            MalformedSnafu {
                message: e.to_string(),
            }
            .build()
        })
    }

    fn reached(&self, end: End) -> bool {
        match end {
            End::At(end) => self.position >= end || self.position >= self.bytes.len(),
            End::Buffer | End::ItemDelimiter => self.position >= self.bytes.len(),
        }
    }
}
