//! Palette color lookup tables.
//!
//! Images with the `PALETTE COLOR` photometric interpretation
//! store one index per pixel,
//! which is mapped to a color through three lookup tables
//! (red, green and blue) declared in the data set.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use dcmkit_core::{tags, DataSet, Endianness, Tag};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum PaletteError {
    #[snafu(display("Missing palette attribute `{}`", name))]
    MissingPaletteAttribute {
        name: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not convert palette attribute `{}`", name))]
    ConvertPaletteValue {
        name: &'static str,
        #[snafu(backtrace)]
        source: dcmkit_core::ConvertValueError,
    },

    #[snafu(display("Invalid palette descriptor `{}`: {:?}", name, values))]
    InvalidPaletteDescriptor {
        name: &'static str,
        values: Vec<i64>,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = PaletteError> = std::result::Result<T, E>;

/// A single channel of a palette color lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteChannel {
    /// the number of entries in the table,
    /// where a declared count of 0 stands for 65536
    entries: u32,
    /// the first stored value mapped by the table
    first_mapped: i64,
    /// the number of bits in each entry of the table
    bits_per_entry: u16,
    /// the table entries
    data: Vec<u16>,
}

impl PaletteChannel {
    /// Create a palette channel from its descriptor and table.
    ///
    /// An entry count of 0 is interpreted as 65536 entries.
    pub fn new(entries: u32, first_mapped: i64, bits_per_entry: u16, data: Vec<u16>) -> Self {
        PaletteChannel {
            entries: if entries == 0 { 65_536 } else { entries },
            first_mapped,
            bits_per_entry,
            data,
        }
    }

    /// The number of entries in the table.
    pub fn entries(&self) -> u32 {
        self.entries
    }

    /// The first stored value mapped by the table.
    pub fn first_mapped(&self) -> i64 {
        self.first_mapped
    }

    /// The number of bits per table entry.
    pub fn bits_per_entry(&self) -> u16 {
        self.bits_per_entry
    }

    /// The position in the table of the entry
    /// for the given stored value.
    pub fn index_of(&self, value: i64) -> usize {
        let last = i64::from(self.entries) - 1;
        (value - self.first_mapped).clamp(0, last) as usize
    }

    /// Map a stored value to an 8-bit intensity,
    /// taking the high byte of the 16-bit table entry.
    ///
    /// Entries missing from a short table map to 0.
    pub fn lookup(&self, value: i64) -> u8 {
        let entry = self.data.get(self.index_of(value)).copied().unwrap_or(0);
        (entry >> 8) as u8
    }
}

/// A palette color lookup table, with one channel per color component.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteColorLut {
    /// the red channel
    pub red: PaletteChannel,
    /// the green channel
    pub green: PaletteChannel,
    /// the blue channel
    pub blue: PaletteChannel,
}

impl PaletteColorLut {
    /// Create a palette color lookup table from its channels.
    pub fn new(red: PaletteChannel, green: PaletteChannel, blue: PaletteChannel) -> Self {
        PaletteColorLut { red, green, blue }
    }

    /// Read the palette color lookup table of a data set,
    /// from the Red, Green and Blue Palette Color Lookup Table
    /// Descriptor and Data attributes.
    pub fn from_dataset(obj: &DataSet) -> Result<Self> {
        Ok(PaletteColorLut {
            red: read_channel(
                obj,
                (
                    tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                    "RedPaletteColorLookupTableDescriptor",
                ),
                (
                    tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                    "RedPaletteColorLookupTableData",
                ),
            )?,
            green: read_channel(
                obj,
                (
                    tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                    "GreenPaletteColorLookupTableDescriptor",
                ),
                (
                    tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                    "GreenPaletteColorLookupTableData",
                ),
            )?,
            blue: read_channel(
                obj,
                (
                    tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                    "BluePaletteColorLookupTableDescriptor",
                ),
                (
                    tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                    "BluePaletteColorLookupTableData",
                ),
            )?,
        })
    }

    /// Map a stored value to an 8-bit RGB color.
    pub fn lookup(&self, value: i64) -> [u8; 3] {
        [
            self.red.lookup(value),
            self.green.lookup(value),
            self.blue.lookup(value),
        ]
    }
}

fn read_channel(
    obj: &DataSet,
    (descriptor_tag, descriptor_name): (Tag, &'static str),
    (data_tag, data_name): (Tag, &'static str),
) -> Result<PaletteChannel> {
    let descriptor = obj
        .multi_int::<i64>(descriptor_tag)
        .context(MissingPaletteAttributeSnafu {
            name: descriptor_name,
        })?
        .context(ConvertPaletteValueSnafu {
            name: descriptor_name,
        })?;

    let (entries, first_mapped, bits_per_entry) = match descriptor.as_slice() {
        [entries, first, bits, ..] => (*entries, *first, *bits),
        _ => {
            return InvalidPaletteDescriptorSnafu {
                name: descriptor_name,
                values: descriptor,
            }
            .fail()
        }
    };
    ensure!(
        (0..=0xFFFF).contains(&entries) && (1..=16).contains(&bits_per_entry),
        InvalidPaletteDescriptorSnafu {
            name: descriptor_name,
            values: descriptor.clone(),
        }
    );
    let bytes = obj
        .get(data_tag)
        .context(MissingPaletteAttributeSnafu { name: data_name })?
        .to_bytes()
        .context(ConvertPaletteValueSnafu { name: data_name })?;
    let mut data = vec![0_u16; bytes.len() / 2];
    match obj.byte_order() {
        Endianness::Little => LittleEndian::read_u16_into(&bytes[..data.len() * 2], &mut data),
        Endianness::Big => BigEndian::read_u16_into(&bytes[..data.len() * 2], &mut data),
    }

    Ok(PaletteChannel::new(
        entries as u32,
        first_mapped,
        bits_per_entry as u16,
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmkit_core::DataElement;

    fn ramp(entries: u32, first_mapped: i64) -> PaletteChannel {
        let data = (0..entries.max(1)).map(|i| (i as u16) << 8).collect();
        PaletteChannel::new(entries, first_mapped, 16, data)
    }

    #[test]
    fn index_is_clamped_to_table() {
        let channel = ramp(256, 100);
        assert_eq!(channel.index_of(50), 0);
        assert_eq!(channel.index_of(100), 0);
        assert_eq!(channel.index_of(110), 10);
        assert_eq!(channel.index_of(355), 255);
        assert_eq!(channel.index_of(1000), 255);
        assert_eq!(channel.lookup(110), 10);
    }

    #[test]
    fn zero_entries_means_65536() {
        let channel = PaletteChannel::new(0, 0, 16, vec![0xFFFF; 4]);
        assert_eq!(channel.entries(), 65_536);
        assert_eq!(channel.index_of(70_000), 65_535);
        // entries missing from the table
        assert_eq!(channel.lookup(70_000), 0);
        assert_eq!(channel.lookup(3), 0xFF);
    }

    #[test]
    fn palette_from_dataset() {
        let mut obj = DataSet::with_byte_order(Endianness::Big);
        for (descriptor, data, value) in [
            (
                tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                0x1200,
            ),
            (
                tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                0x3400,
            ),
            (
                tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                0x5600,
            ),
        ] {
            obj.put(DataElement::new_u16(descriptor, &[2, 10, 16], Endianness::Big));
            obj.put(DataElement::new_words(data, &[0, value], Endianness::Big));
        }

        let palette = PaletteColorLut::from_dataset(&obj).unwrap();
        assert_eq!(palette.red.first_mapped(), 10);
        assert_eq!(palette.lookup(10), [0, 0, 0]);
        assert_eq!(palette.lookup(11), [0x12, 0x34, 0x56]);
        assert_eq!(palette.lookup(200), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn palette_requires_all_channels() {
        let mut obj = DataSet::new();
        obj.put(DataElement::new_u16(
            tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
            &[256, 0, 16],
            Endianness::Little,
        ));
        let err = PaletteColorLut::from_dataset(&obj).unwrap_err();
        assert!(matches!(
            err,
            PaletteError::MissingPaletteAttribute {
                name: "RedPaletteColorLookupTableData",
                ..
            }
        ));
    }
}
