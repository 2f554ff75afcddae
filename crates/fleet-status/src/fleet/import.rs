//! CSV seed import for the trainset data store.
//!
//! Expected header: `id,name,status,availability_percentage,branding_priority,open_job_cards,
//! has_critical_jobs,fitness_expiry,mileage`. `name` and `has_critical_jobs` may be blank.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::classifier::{validate, InvalidSnapshot};
use super::domain::{TrainsetId, TrainsetRecord, TrainsetStatus, UnknownStatus};

#[derive(Debug, thiserror::Error)]
pub enum FleetImportError {
    #[error("failed to open trainset export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse trainset export: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Status {
        row: usize,
        #[source]
        source: UnknownStatus,
    },
    #[error("row {row}: invalid has_critical_jobs flag '{value}' (expected true/false, yes/no, y/n or 1/0)")]
    Flag { row: usize, value: String },
    #[error("row {row}: invalid fitness expiry '{value}' (expected YYYY-MM-DD)")]
    ExpiryDate { row: usize, value: String },
    #[error("row {row}: {source}")]
    Snapshot {
        row: usize,
        #[source]
        source: InvalidSnapshot,
    },
    #[error("row {row}: duplicate trainset id '{id}'")]
    Duplicate { row: usize, id: String },
}

pub fn import_trainsets_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<TrainsetRecord>, FleetImportError> {
    let file = File::open(path)?;
    import_trainsets(file)
}

pub fn import_trainsets<R: Read>(reader: R) -> Result<Vec<TrainsetRecord>, FleetImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records: Vec<TrainsetRecord> = Vec::new();

    for (index, row) in csv_reader.deserialize::<TrainsetRow>().enumerate() {
        // Header is line 1.
        let row_number = index + 2;
        let record = row?.into_record(row_number)?;

        if records.iter().any(|existing| existing.id == record.id) {
            return Err(FleetImportError::Duplicate {
                row: row_number,
                id: record.id.0,
            });
        }

        records.push(record);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct TrainsetRow {
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    status: String,
    availability_percentage: f64,
    branding_priority: i32,
    open_job_cards: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_critical_jobs: Option<String>,
    fitness_expiry: String,
    mileage: f64,
}

impl TrainsetRow {
    fn into_record(self, row: usize) -> Result<TrainsetRecord, FleetImportError> {
        let status = self
            .status
            .parse::<TrainsetStatus>()
            .map_err(|source| FleetImportError::Status { row, source })?;

        let fitness_expiry = NaiveDate::parse_from_str(self.fitness_expiry.trim(), "%Y-%m-%d")
            .map_err(|_| FleetImportError::ExpiryDate {
                row,
                value: self.fitness_expiry.clone(),
            })?;

        let has_critical_jobs = match self.has_critical_jobs {
            Some(value) => parse_flag(&value).ok_or(FleetImportError::Flag { row, value })?,
            None => false,
        };

        let record = TrainsetRecord {
            id: TrainsetId(self.id),
            name: self.name,
            status,
            availability_percentage: self.availability_percentage,
            branding_priority: self.branding_priority,
            open_job_cards: self.open_job_cards,
            has_critical_jobs,
            fitness_expiry,
            mileage: self.mileage,
        };

        validate(&record.snapshot(fitness_expiry))
            .map_err(|source| FleetImportError::Snapshot { row, source })?;

        Ok(record)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::classifier::SnapshotField;

    const HEADER: &str = "id,name,status,availability_percentage,branding_priority,open_job_cards,has_critical_jobs,fitness_expiry,mileage\n";

    #[test]
    fn parses_rows_in_file_order() {
        let csv = format!(
            "{HEADER}TS-02,Blue Line 2,ready,96.5,9,0,false,2025-09-30,12000\nTS-01,,Maintenance,82,4,3,,2025-04-01,19500\n"
        );

        let records = import_trainsets(csv.as_bytes()).expect("csv parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, TrainsetId("TS-02".to_string()));
        assert_eq!(records[0].name.as_deref(), Some("Blue Line 2"));
        assert_eq!(records[1].status, TrainsetStatus::Maintenance);
        assert_eq!(records[1].name, None);
        assert!(!records[1].has_critical_jobs);
        assert_eq!(
            records[1].fitness_expiry,
            NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid")
        );
    }

    #[test]
    fn accepts_yes_no_flags() {
        let csv = format!("{HEADER}TS-03,,standby,91,5,1,Yes,2025-06-01,8000\n");
        let records = import_trainsets(csv.as_bytes()).expect("csv parses");
        assert!(records[0].has_critical_jobs);
    }

    #[test]
    fn rejects_unknown_status_with_row_number() {
        let csv = format!("{HEADER}TS-01,,retired,90,5,0,false,2025-06-01,8000\n");

        match import_trainsets(csv.as_bytes()) {
            Err(FleetImportError::Status { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unrecognised_critical_job_flag_with_row_number() {
        let csv = format!(
            "{HEADER}TS-01,,ready,95,5,0,no,2025-06-01,8000\nTS-02,,ready,95,5,0,ture,2025-06-01,8000\n"
        );

        match import_trainsets(csv.as_bytes()) {
            Err(FleetImportError::Flag { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "ture");
            }
            other => panic!("expected flag error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_explicit_false_flags() {
        let csv = format!(
            "{HEADER}TS-01,,ready,95,5,0,N,2025-06-01,8000\nTS-02,,ready,95,5,0,0,2025-06-01,8000\n"
        );
        let records = import_trainsets(csv.as_bytes()).expect("csv parses");
        assert!(records.iter().all(|record| !record.has_critical_jobs));
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let csv = format!(
            "{HEADER}TS-01,,ready,95,5,0,false,2025-06-01,8000\nTS-02,,ready,150,5,0,false,2025-06-01,8000\n"
        );

        match import_trainsets(csv.as_bytes()) {
            Err(FleetImportError::Snapshot { row, source }) => {
                assert_eq!(row, 3);
                assert_eq!(source.field, SnapshotField::AvailabilityPercentage);
            }
            other => panic!("expected snapshot error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_dates_and_duplicates() {
        let bad_date = format!("{HEADER}TS-01,,ready,95,5,0,false,01/06/2025,8000\n");
        assert!(matches!(
            import_trainsets(bad_date.as_bytes()),
            Err(FleetImportError::ExpiryDate { row: 2, .. })
        ));

        let duplicate = format!(
            "{HEADER}TS-01,,ready,95,5,0,false,2025-06-01,8000\nTS-01,,standby,91,5,0,false,2025-06-01,8000\n"
        );
        assert!(matches!(
            import_trainsets(duplicate.as_bytes()),
            Err(FleetImportError::Duplicate { row: 3, .. })
        ));
    }
}
