//! Census CSV loading.
//!
//! The input format is one header line followed by records of seven
//! comma-separated fields; population, latitude, and longitude sit at fixed
//! indices. Records with population 0 carry sentinel coordinate values in
//! the source data, so they are dropped here and never reach the engine.
//! Any malformed record is a fatal parse error; no partial point set is
//! produced from a corrupt source.

use crate::error::{PopGridError, Result};
use crate::points::{CensusPoint, PointSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Expected number of comma-separated fields per record.
pub const TOKENS_PER_LINE: usize = 7;

// Zero-based field indices within a record.
const POPULATION_INDEX: usize = 4;
const LATITUDE_INDEX: usize = 5;
const LONGITUDE_INDEX: usize = 6;

/// Load a point set from a census CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let file = File::open(path)?;
    parse_records(BufReader::new(file))
}

/// Parse census records from any buffered reader.
///
/// The first line is a header and is skipped. Errors carry the 1-based line
/// number of the offending record.
pub fn parse_records<R: BufRead>(reader: R) -> Result<PointSet> {
    // Flexible so the field count is checked here, with a line number,
    // instead of by the reader's own length enforcement.
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut dropped = 0usize;
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        let line_number = record.position().map_or(0, |pos| pos.line() as usize);

        if record.len() != TOKENS_PER_LINE {
            return Err(parse_error(
                line_number,
                format!(
                    "expected {} comma-separated fields, got {}",
                    TOKENS_PER_LINE,
                    record.len()
                ),
            ));
        }

        let population: u64 = record[POPULATION_INDEX].trim().parse().map_err(|_| {
            parse_error(
                line_number,
                format!("invalid population {:?}", &record[POPULATION_INDEX]),
            )
        })?;
        if population == 0 {
            // Sentinel coordinates, not parseable as floats.
            dropped += 1;
            continue;
        }

        let latitude: f64 = record[LATITUDE_INDEX].trim().parse().map_err(|_| {
            parse_error(
                line_number,
                format!("invalid latitude {:?}", &record[LATITUDE_INDEX]),
            )
        })?;
        let longitude: f64 = record[LONGITUDE_INDEX].trim().parse().map_err(|_| {
            parse_error(
                line_number,
                format!("invalid longitude {:?}", &record[LONGITUDE_INDEX]),
            )
        })?;

        points.push(CensusPoint::new(population, longitude, latitude));
    }

    if dropped > 0 {
        log::debug!("dropped {} zero-population records", dropped);
    }
    log::debug!("loaded {} census points", points.len());
    PointSet::new(points)
}

fn parse_error(line: usize, message: String) -> PopGridError {
    PopGridError::Parse { line, message }
}

fn csv_error(err: csv::Error) -> PopGridError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => PopGridError::Io(io_err),
        _ => PopGridError::Parse { line, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "STATE,COUNTY,TRACT,BLKGRP,POPULATION,LATITUDE,LONGITUDE\n";

    #[test]
    fn test_parse_skips_header_and_reads_fields() {
        let input = format!(
            "{HEADER}53,033,001,1,737015,47.6062,-122.3321\n36,061,002,2,42,40.7128,-74.0060\n"
        );
        let points = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(points.len(), 2);
        let first = points.get(0).unwrap();
        assert_eq!(first.population(), 737_015);
        assert_eq!(first.lat(), 47.6062);
        assert_eq!(first.lon(), -122.3321);
    }

    #[test]
    fn test_zero_population_records_dropped() {
        // Zero-population rows carry sentinel "+."/"-." coordinates that do
        // not parse as floats; they must be skipped, not rejected.
        let input = format!("{HEADER}53,033,001,1,0,+.,-.\n36,061,002,2,42,40.7,-74.0\n");
        let points = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points.get(0).unwrap().population(), 42);
    }

    #[test]
    fn test_wrong_field_count_is_fatal() {
        let input = format!("{HEADER}53,033,001,1,42,47.6\n");
        let err = parse_records(Cursor::new(input)).unwrap_err();
        match err {
            PopGridError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_number_is_fatal() {
        let input = format!("{HEADER}53,033,001,1,42,47.6,east\n");
        assert!(matches!(
            parse_records(Cursor::new(input)),
            Err(PopGridError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_error_line_numbers_count_from_file_start() {
        let input = format!("{HEADER}53,033,001,1,42,47.6,-122.3\n53,033,002,1,nine,47.7,-122.4\n");
        assert!(matches!(
            parse_records(Cursor::new(input)),
            Err(PopGridError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn test_header_only_yields_empty_set() {
        let points = parse_records(Cursor::new(HEADER)).unwrap();
        assert!(points.is_empty());
    }
}
