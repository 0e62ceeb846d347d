use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use log::info;
use thiserror::Error;
use crate::config::{StorageMode, StorageParameters};
use crate::models::TransformedWeatherRow;

const FILE_PREFIX: &str = "current_weather_data_";
const FILE_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Tabular sink for transformed weather rows
pub struct Sink {
    mode: StorageMode,
    bucket: String,
    dir: Option<PathBuf>,
}

impl Sink {
    /// Returns a new sink
    ///
    /// # Arguments
    ///
    /// * 'config' - storage configuration
    pub fn new(config: &StorageParameters) -> Sink {
        Sink {
            mode: config.mode,
            bucket: config.bucket.clone(),
            dir: config.dir.as_ref().map(PathBuf::from),
        }
    }

    /// Returns the object name for a city's row generated at the given time.
    /// Path separators in the city are replaced so the name stays a single file name.
    ///
    /// # Arguments
    ///
    /// * 'city' - city the row belongs to
    /// * 'now' - generation time
    pub fn object_name(city: &str, now: DateTime<Local>) -> String {
        let city = city.replace(['/', '\\'], "_");

        format!("{}{}_{}.csv", FILE_PREFIX, city, now.format(FILE_TIME_FORMAT))
    }

    /// Returns the object storage url for an object
    ///
    /// # Arguments
    ///
    /// * 'object_name' - name of the object within the bucket
    pub fn target(&self, object_name: &str) -> String {
        format!("s3://{}/{}", self.bucket, object_name)
    }

    /// Loads a row into the sink.
    /// Returns the object storage target and, if a file was written, its path
    ///
    /// # Arguments
    ///
    /// * 'row' - the row to load
    /// * 'now' - generation time, used for naming
    pub fn load(&self, row: &TransformedWeatherRow, now: DateTime<Local>) -> Result<(String, Option<String>), StorageError> {
        let object_name = Sink::object_name(&row.city, now);
        let target = self.target(&object_name);

        let written = match (self.mode, &self.dir) {
            (StorageMode::Directory, Some(dir)) => {
                let path = dir.join(&object_name);
                write_csv(&path, row)?;
                info!("Data transformed and written to {}", path.display());

                Some(path.display().to_string())
            }
            _ => {
                info!("Data transformed and theoretically loaded to {}", target);
                None
            }
        };

        Ok((target, written))
    }
}

/// Writes a header and a single row as csv
///
/// # Arguments
///
/// * 'path' - file to create
/// * 'row' - the row to write
fn write_csv(path: &Path, row: &TransformedWeatherRow) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| StorageError::WriteError(format!("{}: {}", path.display(), e)))?;

    writer.serialize(row)
        .map_err(|e| StorageError::WriteError(format!("error serializing row: {}", e)))?;
    writer.flush()
        .map_err(|e| StorageError::WriteError(format!("error flushing {}: {}", path.display(), e)))?;

    Ok(())
}

/// Error depicting errors that occur while loading rows into storage
///
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("WriteError: {0}")]
    WriteError(String),
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use super::*;

    fn at(d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, d, h, 0, 0).single().unwrap()
    }

    fn row() -> TransformedWeatherRow {
        TransformedWeatherRow {
            city: "Portland".to_string(),
            description: "rain, heavy".to_string(),
            temperature_f: 68.0,
            timestamp: "2024-05-03 12:00:00".to_string(),
        }
    }

    fn parameters(mode: StorageMode, dir: Option<&Path>) -> StorageParameters {
        StorageParameters {
            mode,
            bucket: "weather-bucket".to_string(),
            dir: dir.map(|d| d.display().to_string()),
        }
    }

    #[test]
    fn names_objects_after_city_and_minute() {
        let sink = Sink::new(&parameters(StorageMode::Disabled, None));
        let name = Sink::object_name("Portland", at(3, 12));

        assert_eq!(name, "current_weather_data_Portland_202405031200.csv");
        assert_eq!(sink.target(&name), "s3://weather-bucket/current_weather_data_Portland_202405031200.csv");
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(&parameters(StorageMode::Disabled, Some(dir.path())));

        let (target, written) = sink.load(&row(), at(3, 12)).unwrap();

        assert_eq!(target, "s3://weather-bucket/current_weather_data_Portland_202405031200.csv");
        assert!(written.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn directory_sink_writes_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(&parameters(StorageMode::Directory, Some(dir.path())));

        let (_, written) = sink.load(&row(), at(3, 12)).unwrap();
        let content = fs::read_to_string(written.unwrap()).unwrap();

        assert_eq!(
            content,
            "City,Description,Temperature_F,Timestamp\nPortland,\"rain, heavy\",68.0,2024-05-03 12:00:00\n"
        );
    }

    #[test]
    fn earlier_runs_survive_later_loads() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(&parameters(StorageMode::Directory, Some(dir.path())));

        let (_, first) = sink.load(&row(), at(1, 0)).unwrap();
        let (_, second) = sink.load(&row(), at(4, 0)).unwrap();
        let first = PathBuf::from(first.unwrap());
        let second = PathBuf::from(second.unwrap());

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn separators_in_city_stay_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(&parameters(StorageMode::Directory, Some(dir.path())));
        let mut row = row();
        row.city = "../Port/land\\x".to_string();

        let (target, written) = sink.load(&row, at(3, 12)).unwrap();
        let written = PathBuf::from(written.unwrap());

        assert_eq!(Sink::object_name("a/b\\c", at(3, 12)), "current_weather_data_a_b_c_202405031200.csv");
        assert_eq!(target, "s3://weather-bucket/current_weather_data_.._Port_land_x_202405031200.csv");
        assert_eq!(written.parent(), Some(dir.path()));
        assert!(written.exists());
    }
}
