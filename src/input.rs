//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod drive_profile;
pub mod temperature;

/// Generate the error message for a failure to read a particular file
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().to_string_lossy())
}

/// Parse a TOML file at the specified path.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))
}

/// Read a series of type `T`s from a CSV file with a header row.
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(file_path).with_context(|| input_err_msg(file_path))?;

    let mut vec = Vec::new();
    for record in reader.deserialize() {
        let record: T = record.with_context(|| input_err_msg(file_path))?;
        vec.push(record);
    }
    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.to_string_lossy()
    );

    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: String,
        value: f64,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\na,1.0\nb,2.5").unwrap();
        }

        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    id: "a".to_string(),
                    value: 1.0
                },
                Record {
                    id: "b".to_string(),
                    value: 2.5
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value").unwrap();
        }

        let result: Result<Vec<Record>> = read_csv(&file_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("record.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id = \"a\"\nvalue = 1.0").unwrap();
        }

        let record: Record = read_toml(&file_path).unwrap();
        assert_eq!(
            record,
            Record {
                id: "a".to_string(),
                value: 1.0
            }
        );
    }
}
