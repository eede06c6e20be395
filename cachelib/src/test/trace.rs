use std::io::Cursor;
use std::time::Duration;

use crate::error::{ParseError, SimError};
use crate::trace::{check_field_count, parse_line, Operation, TraceSource, MIN_FIELD_COUNT, MSR_FIELD_COUNT, TRACE_FIELD_COUNT};
use crate::workload::WorkloadSummary;

#[test]
fn parses_relabelled_line() {
    let record = parse_line("128166372003061629,hm,0,Read,9933824,4096,101,0", TRACE_FIELD_COUNT).unwrap();
    assert_eq!(record.timestamp, Duration::from_micros(128166372003061629));
    assert_eq!(record.operation, Operation::Read);
    assert_eq!(record.offset, 9933824);
    assert_eq!(record.size, 4096);
    assert_eq!(record.response_time, 101);
}

#[test]
fn rejects_wrong_field_count() {
    let err = parse_line("128166372003061629,hm,0,Read,9933824,4096,101", TRACE_FIELD_COUNT).unwrap_err();
    assert_eq!(err, ParseError::FieldCount { expected: 8, found: 7 });
}

#[test]
fn rejects_non_numeric_fields() {
    let err = parse_line("1,hm,0,Read,abc,4096,101,0", TRACE_FIELD_COUNT).unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidNumber {
            field: "offset",
            value: "abc".to_string()
        }
    );
    assert!(parse_line("1,hm,0,Read,10,-5,101,0", TRACE_FIELD_COUNT).is_err());
    assert!(parse_line("x,hm,0,Read,10,5,101,0", TRACE_FIELD_COUNT).is_err());
    assert!(parse_line("1,hm,0,Read,10,5,1.5,0", TRACE_FIELD_COUNT).is_err());
}

#[test]
fn keeps_unknown_operations() {
    let record = parse_line("1,hm,0,Trim,10,5,1,0", TRACE_FIELD_COUNT).unwrap();
    assert_eq!(record.operation, Operation::Other("Trim".to_string()));
    assert!(!record.operation.is_read());
}

#[test]
fn source_skips_malformed_lines() {
    let input = "\
1,hm,0,Read,4096,4096,10,0\r
2,hm,0,Write,8192,512,10,0

3,hm,0,Read,4096\n\
4,hm,0,Read,nope,4096,10,0
5,hm,0,Read,12288,4096,10,0";
    let source = TraceSource::from_reader(Cursor::new(input), TRACE_FIELD_COUNT).unwrap();
    let offsets: Vec<u64> = source.records().iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![4096, 8192, 12288]);
    assert_eq!(source.skipped_field_count(), 1);
    assert_eq!(source.skipped_invalid(), 1);
    assert_eq!(source.skipped(), 2);
    // The trailing carriage return doesn't leak into the last field
    assert_eq!(source.records()[0].response_time, 10);
}

#[test]
fn source_reads_raw_msr_layout() {
    let input = "128166372003061629,hm,0,Read,9933824,4096,101\n128166372016382155,hm,0,Write,2942976,4096,111\n";
    let source = TraceSource::from_reader(Cursor::new(input), MSR_FIELD_COUNT).unwrap();
    assert_eq!(source.records().len(), 2);
    assert_eq!(source.records()[1].operation, Operation::Write);
    assert_eq!(source.skipped(), 0);
}

#[test]
fn empty_input_is_an_empty_trace() {
    let source = TraceSource::from_reader(Cursor::new(""), TRACE_FIELD_COUNT).unwrap();
    assert!(source.records().is_empty());
    assert_eq!(source.skipped(), 0);
}

#[test]
fn short_layouts_are_rejected_instead_of_indexed() {
    assert_eq!(
        parse_line("1,hm,0", 3).unwrap_err(),
        ParseError::MissingField { field: "operation" }
    );
    assert_eq!(
        parse_line("1,hm,0,Read,10,5", 6).unwrap_err(),
        ParseError::MissingField { field: "response_time" }
    );
    assert_eq!(parse_line("", 1).unwrap_err(), ParseError::InvalidNumber { field: "timestamp", value: String::new() });
}

#[test]
fn field_counts_below_the_minimum_are_invalid() {
    assert!(matches!(check_field_count(3), Err(SimError::InvalidConfig(_))));
    assert!(matches!(check_field_count(MIN_FIELD_COUNT - 1), Err(SimError::InvalidConfig(_))));
    assert_eq!(check_field_count(MSR_FIELD_COUNT).unwrap(), MSR_FIELD_COUNT);
    assert!(matches!(
        TraceSource::from_reader(Cursor::new("1,hm,0\n"), 3),
        Err(SimError::InvalidConfig(_))
    ));
}

#[test]
fn operation_tag_is_compared_verbatim() {
    let record = parse_line("1,hm,0, Read,10,5,1,0", TRACE_FIELD_COUNT).unwrap();
    assert_eq!(record.operation, Operation::Other(" Read".to_string()));
    assert!(!record.operation.is_read());
    assert!(!parse_line("1,hm,0,read,10,5,1,0", TRACE_FIELD_COUNT).unwrap().operation.is_read());
}

#[test]
fn raw_msr_lines_need_the_msr_field_count() {
    let input = "128166372003061629,hm,0,Read,9933824,1073741824,101\n128166372016382155,hm,0,Write,2942976,536870912,111\n";

    let relabelled = TraceSource::from_reader(Cursor::new(input), TRACE_FIELD_COUNT).unwrap();
    assert!(relabelled.records().is_empty());
    assert_eq!(relabelled.skipped_field_count(), 2);

    let raw = TraceSource::from_reader(Cursor::new(input), MSR_FIELD_COUNT).unwrap();
    assert_eq!(raw.skipped(), 0);
    let summary = WorkloadSummary::from_records(raw.records());
    assert_eq!(summary.read_size_gib, 1.0);
    assert_eq!(summary.write_size_gib, 0.5);
    assert_eq!(raw.records()[0].operation, Operation::Read);
    assert_eq!(raw.records()[1].operation, Operation::Write);
}
