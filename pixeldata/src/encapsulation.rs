//! DICOM pixel data encapsulation
//!
//! This module implements the retrieval of frames
//! from encapsulated pixel data.
use dcmkit_core::PixelFragmentSequence;
use dcmkit_encoding::PixelDataDescriptor;
use snafu::{ensure, Backtrace, OptionExt, Snafu};
use std::borrow::Cow;

/// The number of bytes of an item header in a pixel data sequence.
const ITEM_HEADER_LEN: u64 = 8;

#[derive(Debug, Snafu)]
pub enum EncapsulationError {
    #[snafu(display("Frame #{} is out of range (number of frames: {})", frame, frames))]
    FrameOutOfRange {
        frame: u32,
        frames: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("No fragment for frame #{}", frame))]
    MissingFragment { frame: u32, backtrace: Backtrace },

    #[snafu(display("Offset table does not match the fragments of frame #{}", frame))]
    InvalidOffsetTable { frame: u32, backtrace: Backtrace },
}

pub type Result<T, E = EncapsulationError> = std::result::Result<T, E>;

/// A view of encapsulated pixel data:
/// the basic offset table, the compressed fragments
/// and the descriptor of the image that they encode.
#[derive(Debug, Clone, Copy)]
pub struct EncapsulatedPixelData<'a> {
    sequence: &'a PixelFragmentSequence,
    descriptor: &'a PixelDataDescriptor,
}

impl<'a> EncapsulatedPixelData<'a> {
    pub fn new(sequence: &'a PixelFragmentSequence, descriptor: &'a PixelDataDescriptor) -> Self {
        EncapsulatedPixelData {
            sequence,
            descriptor,
        }
    }

    /// The image descriptor.
    pub fn descriptor(&self) -> &'a PixelDataDescriptor {
        self.descriptor
    }

    /// The basic offset table, possibly empty.
    pub fn offset_table(&self) -> &'a [u32] {
        self.sequence.offset_table()
    }

    /// The compressed fragments, in order.
    pub fn fragments(&self) -> &'a [Vec<u8>] {
        self.sequence.fragments()
    }

    /// Retrieve the compressed bytes of a frame,
    /// without item headers.
    ///
    /// The basic offset table is used if it has an entry for every frame.
    /// Otherwise, a single frame image is made of all fragments,
    /// and a multi-frame image has one fragment per frame.
    pub fn frame_data(&self, frame: u32) -> Result<Cow<'a, [u8]>> {
        let frames = self.descriptor.number_of_frames;
        ensure!(frame < frames, FrameOutOfRangeSnafu { frame, frames });

        let fragments = self.fragments();
        let offset_table = self.offset_table();

        if !offset_table.is_empty() && offset_table.len() >= frames as usize {
            let start = u64::from(offset_table[frame as usize]);
            let end = match offset_table.get(frame as usize + 1) {
                Some(end) if frame + 1 < frames => u64::from(*end),
                _ => fragments
                    .iter()
                    .map(|f| f.len() as u64 + ITEM_HEADER_LEN)
                    .sum(),
            };

            let mut position = 0;
            let mut selected = Vec::new();
            for fragment in fragments {
                if position >= start && position < end {
                    selected.push(fragment.as_slice());
                }
                position += fragment.len() as u64 + ITEM_HEADER_LEN;
            }
            ensure!(!selected.is_empty(), InvalidOffsetTableSnafu { frame });
            return Ok(concat(selected));
        }

        if frames == 1 {
            ensure!(!fragments.is_empty(), MissingFragmentSnafu { frame });
            return Ok(concat(fragments.iter().map(Vec::as_slice).collect()));
        }

        fragments
            .get(frame as usize)
            .map(|f| Cow::Borrowed(f.as_slice()))
            .context(MissingFragmentSnafu { frame })
    }
}

fn concat(parts: Vec<&[u8]>) -> Cow<'_, [u8]> {
    match parts.as_slice() {
        [single] => Cow::Borrowed(*single),
        _ => Cow::Owned(parts.concat()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(frames: u32) -> PixelDataDescriptor {
        PixelDataDescriptor {
            number_of_frames: frames,
            ..PixelDataDescriptor::new_monochrome(2, 2, 8)
        }
    }

    #[test]
    fn frames_from_offset_table() {
        let seq = PixelFragmentSequence::new(
            vec![0, 24],
            vec![vec![1; 4], vec![2; 4], vec![3; 6], vec![4; 2]],
        );
        let desc = descriptor(2);
        let data = EncapsulatedPixelData::new(&seq, &desc);

        let frame = data.frame_data(0).unwrap();
        assert_eq!(&*frame, &[1, 1, 1, 1, 2, 2, 2, 2]);
        let frame = data.frame_data(1).unwrap();
        assert_eq!(&*frame, &[3, 3, 3, 3, 3, 3, 4, 4]);
        assert!(matches!(
            data.frame_data(2),
            Err(EncapsulationError::FrameOutOfRange { .. })
        ));
    }

    #[test]
    fn offset_table_from_frames() {
        let seq = PixelFragmentSequence::from_frames(vec![vec![7; 3], vec![8; 4], vec![9; 2]]);
        let desc = descriptor(3);
        let data = EncapsulatedPixelData::new(&seq, &desc);
        assert_eq!(&*data.frame_data(0).unwrap(), &[7, 7, 7, 0]);
        assert_eq!(&*data.frame_data(1).unwrap(), &[8, 8, 8, 8]);
        assert_eq!(&*data.frame_data(2).unwrap(), &[9, 9]);
    }

    #[test]
    fn one_fragment_per_frame_without_offset_table() {
        let seq = PixelFragmentSequence::new(vec![], vec![vec![1, 2], vec![3, 4]]);
        let desc = descriptor(2);
        let data = EncapsulatedPixelData::new(&seq, &desc);
        assert_eq!(&*data.frame_data(1).unwrap(), &[3, 4]);
        assert!(matches!(data.frame_data(0).unwrap(), Cow::Borrowed(_)));

        let seq = PixelFragmentSequence::new(vec![], vec![vec![1, 2]]);
        let data = EncapsulatedPixelData::new(&seq, &desc);
        assert!(matches!(
            data.frame_data(1),
            Err(EncapsulationError::MissingFragment { frame: 1, .. })
        ));
    }

    #[test]
    fn single_frame_joins_all_fragments() {
        let seq = PixelFragmentSequence::new(vec![], vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
        let desc = descriptor(1);
        let data = EncapsulatedPixelData::new(&seq, &desc);
        assert_eq!(&*data.frame_data(0).unwrap(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn offset_table_must_hit_a_fragment() {
        let seq = PixelFragmentSequence::new(vec![0, 4], vec![vec![1; 8]]);
        let desc = descriptor(2);
        let data = EncapsulatedPixelData::new(&seq, &desc);
        assert!(matches!(
            data.frame_data(1),
            Err(EncapsulationError::InvalidOffsetTable { frame: 1, .. })
        ));
    }
}
