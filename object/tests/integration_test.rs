use std::fs::File;
use std::io::{BufReader, Read};

use dcmkit_core::{tags, uids, DataElement, DataSet, Endianness, PixelFragmentSequence, Tag, VR};
use dcmkit_object::{
    file::{OpenFileOptions, ReadPreamble},
    open_file, DicomFile, FileMetaTableBuilder,
};

fn liver_like_file(ts: &str) -> DicomFile {
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(ts)
        .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid("1.3.6.1.4.1.5962.1.1.0.0.0.1194734704.16302.0.3")
        .source_application_entity_title("ANY-SCP")
        .build()
        .unwrap();
    let mut dataset = DataSet::new();
    dataset.put(DataElement::new_str(tags::STUDY_DATE, VR::DA, "20030417"));
    dataset.put(DataElement::new_str(tags::MODALITY, VR::CS, "CT"));
    dataset.put(DataElement::new_u16(tags::ROWS, &[2], Endianness::Little));
    dataset.put(DataElement::new_u16(tags::COLUMNS, &[2], Endianness::Little));
    DicomFile::new(meta, dataset)
}

fn write_temp(file: &DicomFile) -> tempfile::NamedTempFile {
    let out = tempfile::NamedTempFile::new().unwrap();
    file.write_to_file(out.path()).unwrap();
    out
}

#[test]
fn test_write_and_open_file() {
    let file = liver_like_file(uids::EXPLICIT_VR_LITTLE_ENDIAN);
    let tmp = write_temp(&file);

    let read = open_file(tmp.path()).unwrap();
    assert_eq!(read.meta().transfer_syntax(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    assert_eq!(
        read.meta().source_application_entity_title.as_deref(),
        Some("ANY-SCP ")
    );
    let element = read.dataset().element(tags::STUDY_DATE).unwrap();
    assert_eq!(element.to_str().unwrap(), "20030417");
    assert_eq!(read.dataset(), file.dataset());
}

#[test]
fn test_read_until_pixel_data() {
    let mut file = liver_like_file(uids::RLE_LOSSLESS);
    file.dataset_mut()
        .put(DataElement::new_pixel_sequence(PixelFragmentSequence::from_frames(vec![
            vec![1, 0, 0, 0],
        ])));
    let tmp = write_temp(&file);

    let read = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(tmp.path())
        .expect("File should open successfully");

    // contains other elements such as modality
    let element = read.dataset().element(tags::MODALITY).unwrap();
    assert_eq!(element.to_str().unwrap(), "CT");

    // but does not contain pixel data
    assert!(read.dataset().element(tags::PIXEL_DATA).is_err());

    // which is there when reading everything
    let read = open_file(tmp.path()).unwrap();
    assert_eq!(read.dataset().get(Tag::PIXEL_DATA), file.dataset().get(Tag::PIXEL_DATA));
}

#[test]
fn test_read_data_with_preamble() {
    let tmp = write_temp(&liver_like_file(uids::IMPLICIT_VR_LITTLE_ENDIAN));
    let source = BufReader::new(File::open(tmp.path()).unwrap());

    let read = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Always)
        .from_reader(source)
        .expect("Should read from source successfully");

    let element = read.dataset().element(tags::STUDY_DATE).unwrap();
    assert_eq!(element.to_str().unwrap(), "20030417");
}

#[test]
fn test_read_data_without_preamble() {
    let tmp = write_temp(&liver_like_file(uids::IMPLICIT_VR_LITTLE_ENDIAN));
    let mut source = BufReader::new(File::open(tmp.path()).unwrap());

    // read preamble manually
    let mut preamble = [0; 128];
    source.read_exact(&mut preamble).unwrap();

    // explicitly do not read preamble
    let read = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Never)
        .from_reader(source)
        .expect("Should read from source successfully");

    let element = read.dataset().element(tags::STUDY_DATE).unwrap();
    assert_eq!(element.to_str().unwrap(), "20030417");
}

#[test]
fn test_read_data_without_preamble_auto() {
    let tmp = write_temp(&liver_like_file(uids::EXPLICIT_VR_LITTLE_ENDIAN));
    let mut source = BufReader::new(File::open(tmp.path()).unwrap());

    // skip preamble
    let mut preamble = [0; 128];
    source.read_exact(&mut preamble).unwrap();

    // detect lack of preamble automatically
    let read = OpenFileOptions::new()
        .from_reader(source)
        .expect("Should read from source successfully");

    let element = read.dataset().element(tags::STUDY_DATE).unwrap();
    assert_eq!(element.to_str().unwrap(), "20030417");
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_file(dir.path().join("missing.dcm")).unwrap_err();
    assert!(matches!(err, dcmkit_object::ReadError::OpenFile { .. }));
}
