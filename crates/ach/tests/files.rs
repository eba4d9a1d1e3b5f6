//! End-to-end tests over ACH fixture files.

use std::{fs, path::PathBuf};

use ach::{
    Category, ConsistencyError, EntryIterator, Error, File, MergeOpts, Reader, SecCode,
    SegmentConfig, ValidateOpts,
    record::codes,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn read_fixture(name: &str) -> File {
    let input = fs::File::open(fixture(name)).unwrap();
    ach::read(input).unwrap()
}

#[test]
fn test_read_ppd_debit() {
    let file = read_fixture("ppd-debit.ach");
    file.validate().unwrap();

    assert_eq!(file.batches.len(), 1);
    let batch = &file.batches[0];
    assert_eq!(batch.sec_code(), SecCode::Ppd);
    assert_eq!(batch.header().service_class_code, codes::DEBITS_ONLY);

    let entry = &batch.entries()[0];
    assert_eq!(entry.amount, 50_000);
    assert_eq!(entry.rdfi_identification, "07640125");
    assert_eq!(entry.addenda05.len(), 1);
    assert_eq!(entry.addenda05[0].payment_related_information, "Payment for invoice 10442");
    assert_eq!(file.file_control.entry_hash, 7_640_125);
}

#[test]
fn test_write_reproduces_fixture() {
    let raw = fs::read(fixture("ppd-debit.ach")).unwrap();
    let file = ach::read(raw.as_slice()).unwrap();
    assert_eq!(ach::write_to_vec(&file).unwrap(), raw);

    let raw = fs::read(fixture("ppd-return.ach")).unwrap();
    let file = ach::read(raw.as_slice()).unwrap();
    assert_eq!(ach::write_to_vec(&file).unwrap(), raw);
}

#[test]
fn test_unterminated_lines() {
    let joined = read_fixture("ppd-debit-unterminated.ach");
    assert_eq!(joined, read_fixture("ppd-debit.ach"));
}

#[test]
fn test_crlf_with_two_batches() {
    let mut reader = Reader::new(fs::File::open(fixture("ppd-mixed-crlf.ach")).unwrap());
    let file = reader.read().unwrap();
    assert_eq!(reader.records_read(), 10);
    file.validate().unwrap();

    assert_eq!(file.batch_count(), 2);
    assert_eq!(file.file_control.total_credit_entry_dollar_amount_in_file, 100_007_500);
    assert_eq!(file.file_control.total_debit_entry_dollar_amount_in_file, 50_000);
    assert_eq!(file.file_control.entry_hash, 42_882_423);
    assert_eq!(file.block_count(), 1);
}

#[test]
fn test_return_entries() {
    let file = read_fixture("ppd-return.ach");
    file.validate().unwrap();
    assert_eq!(file.return_entries().len(), 1);
    assert!(file.notifications_of_change().is_empty());

    let entry = &file.batches[0].entries()[0];
    assert_eq!(entry.category(), Category::Return);
    let addenda = entry.addenda99.as_ref().unwrap();
    assert_eq!(addenda.return_code, "R01");
    assert_eq!(addenda.original_trace, "121042880000001");
}

#[test]
fn test_bad_control_reads_but_fails_validation() {
    let file = read_fixture("ppd-debit-bad-control.ach");
    let err = file.validate().unwrap_err();
    assert_eq!(err.path(), Some("fileControl"));
    assert!(matches!(
        err,
        Error::Consistency {
            error: ConsistencyError::Aggregate {
                field: "entryAddendaCount",
                expected: 2,
                actual: 5,
            },
            ..
        }
    ));
    let skip = ValidateOpts { skip_all: true, ..Default::default() };
    assert!(file.validate_with(&skip).is_ok());
}

#[test]
fn test_entry_iterator() {
    let input = fs::File::open(fixture("ppd-mixed-crlf.ach")).unwrap();
    let pairs: Vec<_> = EntryIterator::new(input).map(Result::unwrap).collect();
    let summary: Vec<(u32, u64)> =
        pairs.iter().map(|(header, entry)| (header.batch_number, entry.amount)).collect();
    assert_eq!(summary, [(1, 100_000_000), (1, 50_000), (2, 7_500)]);

    let reader = Reader::new(fs::File::open(fixture("ppd-debit.ach")).unwrap());
    let pairs: Vec<_> = reader.into_entries().collect();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].as_ref().unwrap().1.addenda05.len(), 1);
}

#[test]
fn test_entry_iterator_without_line_breaks() {
    let text = fs::read_to_string(fixture("ppd-debit.ach")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let count = 10_000;
    let mut input = String::from(lines[0]);
    input.push_str(lines[1]);
    for _ in 0..count {
        input.push_str(lines[2]);
        input.push_str(lines[3]);
    }
    input.push_str(lines[4]);
    input.push_str(lines[5]);

    let mut iter = EntryIterator::new(input.as_bytes());
    let mut seen = 0;
    for item in iter.by_ref() {
        let (header, entry) = item.unwrap();
        assert_eq!(header.batch_number, 1);
        assert_eq!(entry.addenda05.len(), 1);
        seen += 1;
    }
    assert_eq!(seen, count);
    assert_eq!(iter.records_read(), 2 * count + 4);
}

#[test]
fn test_segment_fixture() {
    let file = read_fixture("ppd-mixed-crlf.ach");
    let (credits, debits) = ach::segment_file(&file, &SegmentConfig::default()).unwrap();
    assert_eq!(credits.batch_count(), 2);
    assert_eq!(debits.batch_count(), 1);
    assert_eq!(credits.file_control.total_credit_entry_dollar_amount_in_file, 100_007_500);
    assert_eq!(debits.file_control.total_debit_entry_dollar_amount_in_file, 50_000);
    assert_eq!(debits.batches[0].entries()[0].trace_number, "121042880000002");
    assert_eq!(credits.batches[1].entries()[0].trace_number, "121042880000001");

    for part in [&credits, &debits] {
        let back = ach::read(ach::write_to_vec(part).unwrap().as_slice()).unwrap();
        back.validate().unwrap();
        assert_eq!(&back, part);
    }
}

#[test]
fn test_merge_fixtures() {
    let inputs = [read_fixture("ppd-debit.ach"), read_fixture("ppd-mixed-crlf.ach")];
    let merged = ach::merge_files(&inputs, &MergeOpts::default()).unwrap();
    assert_eq!(merged.files.len(), 1);

    let file = &merged.files[0];
    file.validate().unwrap();
    assert_eq!(file.batch_count(), 3);
    assert_eq!(file.file_control.entry_addenda_count, 5);
    let numbers: Vec<u32> = merged.manifest.iter().map(|p| p.batch_number).collect();
    assert_eq!(numbers, [1, 2, 3]);
}

#[test]
fn test_json_roundtrip() {
    let file = read_fixture("ppd-mixed-crlf.ach");
    let json = file.to_json_pretty().unwrap();
    assert!(json.contains("\"entryDetails\""));
    let back = File::from_json(json.as_bytes()).unwrap();
    assert_eq!(back, file);
    back.validate().unwrap();
}

#[test]
fn test_relaxed_reading() {
    let text = fs::read_to_string(fixture("ppd-debit.ach")).unwrap();
    let body: Vec<&str> = text.lines().skip(1).take(4).collect();
    let opts = ValidateOpts {
        allow_missing_file_header: true,
        allow_missing_file_control: true,
        ..Default::default()
    };
    let input = body.join("\n");
    let mut reader = Reader::new(input.as_bytes()).with_validation(opts);
    let file = reader.read().unwrap();
    assert_eq!(file.batches[0].entries().len(), 1);
    assert_eq!(reader.warnings().len(), 2);
}
