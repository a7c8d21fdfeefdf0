//! Flat-file store of candle series.
//!
//! Each `(symbol, timeframe)` pair lives in `<root>/<symbol>_<timeframe>.csv`
//! and combined tables in `<root>/<symbol>_combined.csv`. Files are only ever
//! replaced through a temp file in the same directory followed by a rename,
//! so readers see either the previous or the new content, never a prefix.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use snafu::{Backtrace, IntoError, ResultExt, Snafu};
use tracing::debug;

use crate::models::{
    candle::{CANDLE_COLUMNS, COMBINED_COLUMNS, CandleRecord, CombinedRecord},
    dataset_info::DatasetInfo,
    series_key::{SeriesKey, Symbol},
};

const CSV_EXTENSION: &str = "csv";
const COMBINED_SUFFIX: &str = "combined";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// No file is stored for the requested key.
    #[snafu(display("No stored data at {}", path.display()))]
    NotFound { path: PathBuf, backtrace: Backtrace },

    /// The file exists but does not follow the expected schema.
    #[snafu(display("Corrupt data in {}: {message}", path.display()))]
    CorruptData {
        path: PathBuf,
        message: String,
        backtrace: Backtrace,
    },

    /// Reading an existing file failed.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: io::Error,
        backtrace: Backtrace,
    },

    /// Creating, writing or renaming a file failed.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: io::Error,
        backtrace: Backtrace,
    },

    /// A row could not be encoded as CSV.
    #[snafu(display("Failed to encode rows for {}: {source}", path.display()))]
    Encode {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::CorruptData { .. })
    }

    /// Whether persisting a file failed.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Write { .. } | StoreError::Encode { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            StoreError::NotFound { path, .. }
            | StoreError::CorruptData { path, .. }
            | StoreError::Read { path, .. }
            | StoreError::Write { path, .. }
            | StoreError::Encode { path, .. } => path,
        }
    }
}

/// Local store rooted at an explicit directory.
///
/// The root is created lazily on the first write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/{symbol}_{timeframe}.csv`; monthly series use the `1mo` label.
    pub fn path_for(&self, key: &SeriesKey) -> PathBuf {
        self.root.join(format!(
            "{}_{}.{CSV_EXTENSION}",
            key.symbol,
            key.timeframe.file_label()
        ))
    }

    /// Path of the combined file of `symbol`, whatever timeframes it holds.
    pub fn combined_path_for(&self, symbol: &Symbol) -> PathBuf {
        self.root
            .join(format!("{symbol}_{COMBINED_SUFFIX}.{CSV_EXTENSION}"))
    }

    pub fn exists(&self, key: &SeriesKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Replaces the stored series of `key` with `records`, written in the given order.
    pub fn write(&self, key: &SeriesKey, records: &[CandleRecord]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(key);
        self.write_atomic(&path, &CANDLE_COLUMNS, records)?;
        debug!(%key, rows = records.len(), path = %path.display(), "stored series");
        Ok(path)
    }

    pub fn read(&self, key: &SeriesKey) -> Result<Vec<CandleRecord>, StoreError> {
        let path = self.path_for(key);
        let file = open_existing(&path)?;
        let records = read_rows(&path, file, &CANDLE_COLUMNS)?;
        ensure_ascending(&path, &records)?;
        Ok(records)
    }

    /// Metadata of the stored series of `key`.
    ///
    /// Size, modification time and rows all come from one open handle, so a
    /// concurrent replacement cannot produce a mixed snapshot.
    pub fn stats(&self, key: &SeriesKey) -> Result<DatasetInfo, StoreError> {
        let path = self.path_for(key);
        let file = open_existing(&path)?;
        let metadata = file.metadata().context(ReadSnafu { path: &path })?;
        let modified: DateTime<Utc> = metadata.modified().context(ReadSnafu { path: &path })?.into();

        let records: Vec<CandleRecord> = read_rows(&path, file, &CANDLE_COLUMNS)?;
        ensure_ascending(&path, &records)?;

        Ok(DatasetInfo {
            symbol: key.symbol.clone(),
            timeframe: key.timeframe,
            rows: records.len(),
            start: records.first().map(|r| r.timestamp),
            end: records.last().map(|r| r.timestamp),
            file_size_bytes: metadata.len(),
            modified,
            path,
        })
    }

    pub fn write_combined(
        &self,
        symbol: &Symbol,
        rows: &[CombinedRecord],
    ) -> Result<PathBuf, StoreError> {
        let path = self.combined_path_for(symbol);
        self.write_atomic(&path, &COMBINED_COLUMNS, rows)?;
        debug!(%symbol, rows = rows.len(), path = %path.display(), "stored combined table");
        Ok(path)
    }

    /// Reads a combined table back in file order.
    pub fn read_combined(&self, symbol: &Symbol) -> Result<Vec<CombinedRecord>, StoreError> {
        let path = self.combined_path_for(symbol);
        let file = open_existing(&path)?;
        read_rows(&path, file, &COMBINED_COLUMNS)
    }

    fn write_atomic<T: Serialize>(
        &self,
        path: &Path,
        header: &[&str],
        rows: &[T],
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).context(WriteSnafu { path: &self.root })?;

        let tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .context(WriteSnafu { path })?;

        // Header is written by hand so that an empty series still gets one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp);
        writer.write_record(header).context(EncodeSnafu { path })?;
        for row in rows {
            writer.serialize(row).context(EncodeSnafu { path })?;
        }
        writer.flush().context(WriteSnafu { path })?;

        let mut tmp = writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
            .context(WriteSnafu { path })?;
        tmp.flush().context(WriteSnafu { path })?;
        tmp.as_file().sync_all().context(WriteSnafu { path })?;

        // Dropping `tmp` on any earlier return removes the partial file.
        tmp.persist(path)
            .map_err(|e| e.error)
            .context(WriteSnafu { path })?;
        Ok(())
    }
}

fn open_existing(path: &Path) -> Result<File, StoreError> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => NotFoundSnafu { path }.fail(),
        Err(e) => Err(e).context(ReadSnafu { path }),
    }
}

fn read_rows<T: DeserializeOwned>(
    path: &Path,
    file: File,
    expected: &[&str],
) -> Result<Vec<T>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| decode_error(path, e))?
        .clone();
    if !headers.iter().eq(expected.iter().copied()) {
        return CorruptDataSnafu {
            path,
            message: format!(
                "expected columns {:?}, found {:?}",
                expected,
                headers.iter().collect::<Vec<_>>()
            ),
        }
        .fail();
    }

    reader
        .deserialize()
        .map(|row| row.map_err(|e| decode_error(path, e)))
        .collect()
}

/// I/O failures stay read errors; everything else means the content is bad.
fn decode_error(path: &Path, err: csv::Error) -> StoreError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => ReadSnafu { path }.into_error(source),
        _ => CorruptDataSnafu { path, message }.build(),
    }
}

fn ensure_ascending(path: &Path, records: &[CandleRecord]) -> Result<(), StoreError> {
    if let Some(row) = records
        .windows(2)
        .position(|pair| pair[0].timestamp >= pair[1].timestamp)
    {
        return CorruptDataSnafu {
            path,
            message: format!(
                "timestamps not strictly ascending at data row {}: {} then {}",
                row + 2,
                records[row].timestamp,
                records[row + 1].timestamp
            ),
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::*;
    use crate::models::timeframe::Timeframe;

    fn key(symbol: &str, tf: Timeframe) -> SeriesKey {
        SeriesKey::new(Symbol::new(symbol).unwrap(), tf)
    }

    fn candles(n: i64) -> Vec<CandleRecord> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| CandleRecord {
                timestamp: t0 + Duration::minutes(15 * i),
                open: dec!(100) + rust_decimal::Decimal::from(i),
                high: dec!(110.5),
                low: dec!(95.25),
                close: dec!(101),
                volume: dec!(0.001),
            })
            .collect()
    }

    #[test]
    fn path_is_derived_from_key() {
        let store = LocalStore::new("/data");
        assert_eq!(
            store.path_for(&key("BTCUSDT", Timeframe::M15)),
            PathBuf::from("/data/BTCUSDT_15m.csv")
        );
        assert_eq!(
            store.combined_path_for(&Symbol::new("BTCUSDT").unwrap()),
            PathBuf::from("/data/BTCUSDT_combined.csv")
        );
        assert_ne!(
            store.path_for(&key("BTCUSDT", Timeframe::M1)),
            store.path_for(&key("BTCUSDT", Timeframe::M15))
        );
    }

    #[test]
    fn paths_stay_distinct_on_case_insensitive_filesystems() {
        let store = LocalStore::new("/data");
        let month: Timeframe = "1M".parse().unwrap();
        let minute = store.path_for(&key("BTCUSDT", Timeframe::M1));
        let monthly = store.path_for(&key("BTCUSDT", month));
        assert_eq!(monthly, PathBuf::from("/data/BTCUSDT_1mo.csv"));
        assert_ne!(
            minute.to_string_lossy().to_lowercase(),
            monthly.to_string_lossy().to_lowercase()
        );
        assert_eq!(
            store.path_for(&key("btcusdt", Timeframe::H1)),
            PathBuf::from("/data/BTCUSDT_1h.csv")
        );
    }

    #[test]
    fn write_then_read_preserves_rows_and_header() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        let k = key("ETHUSDT", Timeframe::H1);
        let rows = candles(3);

        assert!(!store.exists(&k));
        let path = store.write(&k, &rows).unwrap();
        assert!(store.exists(&k));
        assert_eq!(store.read(&k).unwrap(), rows);

        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,open,high,low,close,volume"));
        assert_eq!(
            lines.next(),
            Some("2024-01-01T00:00:00Z,100,110.5,95.25,101,0.001")
        );
    }

    #[test]
    fn empty_series_still_has_header() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("ETHUSDT", Timeframe::H1);
        let path = store.write(&k, &[]).unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap().trim_end(),
            "timestamp,open,high,low,close,volume"
        );
        let info = store.stats(&k).unwrap();
        assert_eq!(info.rows, 0);
        assert_eq!(info.start, None);
    }

    #[test]
    fn write_replaces_previous_content_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::M15);

        store.write(&k, &candles(5)).unwrap();
        store.write(&k, &candles(2)).unwrap();
        assert_eq!(store.read(&k).unwrap().len(), 2);

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["BTCUSDT_15m.csv".to_string()]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::D1);

        assert!(store.read(&k).unwrap_err().is_not_found());
        let err = store.stats(&k).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), store.path_for(&k));
    }

    #[test]
    fn stats_reports_span_and_size() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::M15);
        let rows = candles(4);
        let path = store.write(&k, &rows).unwrap();

        let info = store.stats(&k).unwrap();
        assert_eq!(info.symbol.as_str(), "BTCUSDT");
        assert_eq!(info.timeframe, Timeframe::M15);
        assert_eq!(info.rows, 4);
        assert_eq!(info.start, Some(rows[0].timestamp));
        assert_eq!(info.end, Some(rows[3].timestamp));
        assert_eq!(info.file_size_bytes, fs::metadata(&path).unwrap().len());
        assert_eq!(info.path, path);
        assert!(info.file_size_mb() > 0.0);
    }

    #[test]
    fn wrong_header_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::M15);
        fs::write(
            store.path_for(&k),
            "time,open,high,low,close,volume\n2024-01-01T00:00:00Z,1,1,1,1,1\n",
        )
        .unwrap();

        assert!(store.read(&k).unwrap_err().is_corrupt());
        assert!(store.stats(&k).unwrap_err().is_corrupt());
    }

    #[test]
    fn unparsable_row_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::M15);
        fs::write(
            store.path_for(&k),
            "timestamp,open,high,low,close,volume\nyesterday,1,1,1,1,1\n",
        )
        .unwrap();
        assert!(store.read(&k).unwrap_err().is_corrupt());

        fs::write(
            store.path_for(&k),
            "timestamp,open,high,low,close,volume\n2024-01-01T00:00:00Z,1,1,1,1\n",
        )
        .unwrap();
        assert!(store.read(&k).unwrap_err().is_corrupt());
    }

    #[test]
    fn unsorted_rows_are_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let k = key("BTCUSDT", Timeframe::M15);
        let mut rows = candles(3);
        rows.swap(0, 2);
        store.write(&k, &rows).unwrap();

        let err = store.read(&k).unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("ascending"));
    }

    #[test]
    fn combined_round_trip_keeps_block_order() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let symbol = Symbol::new("BTCUSDT").unwrap();
        let mut rows: Vec<CombinedRecord> = candles(2)
            .into_iter()
            .map(|c| CombinedRecord::new(c, Timeframe::M15))
            .collect();
        rows.extend(
            candles(1)
                .into_iter()
                .map(|c| CombinedRecord::new(c, Timeframe::H1)),
        );

        let path = store.write_combined(&symbol, &rows).unwrap();
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("timestamp,open,high,low,close,volume,timeframe\n"));
        assert_eq!(store.read_combined(&symbol).unwrap(), rows);
    }

    #[test]
    fn write_into_unwritable_root_is_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let store = LocalStore::new(blocker.join("root"));

        let err = store
            .write(&key("BTCUSDT", Timeframe::M15), &candles(1))
            .unwrap_err();
        assert!(err.is_write());
    }
}
