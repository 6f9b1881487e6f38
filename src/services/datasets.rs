//! Dataset CSV storage: loading into the canonical schema and raw uploads.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    errors::{ServiceError, ServiceResult},
    models::{Column, Dataset, DatasetKind, DatasetRow},
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads and writes the dataset CSVs under the data directory.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Loads a dataset, or an empty one when its file does not exist.
    pub async fn load(&self, kind: DatasetKind) -> ServiceResult<Dataset> {
        let path = self.path(kind);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(dataset = %kind, "dataset file not present; using empty dataset");
                return Ok(Dataset::empty(kind));
            }
            Err(err) => return Err(ServiceError::parse(kind.file_name(), err)),
        };

        parse_dataset(kind, &bytes).map_err(|err| {
            warn!(dataset = %kind, error = %err, "failed to parse dataset");
            err
        })
    }

    fn staging_path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(format!(".{}.tmp", kind.file_name()))
    }

    /// Replaces dataset files with uploaded bytes, stored verbatim.
    ///
    /// Every file is first written to a staging sibling; the live files are only
    /// renamed over once all staging writes succeeded, so a failed write leaves
    /// every existing dataset untouched.
    pub async fn save_all(&self, files: &[(DatasetKind, &[u8])]) -> ServiceResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        for (index, (kind, bytes)) in files.iter().enumerate() {
            if let Err(err) = tokio::fs::write(self.staging_path(*kind), bytes).await {
                warn!(dataset = %kind, error = %err, "failed to stage uploaded dataset");
                for (staged, _) in &files[..index] {
                    let _ = tokio::fs::remove_file(self.staging_path(*staged)).await;
                }
                return Err(err.into());
            }
        }

        for (kind, bytes) in files {
            tokio::fs::rename(self.staging_path(*kind), self.path(*kind)).await?;
            info!(dataset = %kind, bytes = bytes.len(), "stored uploaded dataset");
        }
        Ok(())
    }
}

/// Parses CSV bytes into the canonical schema.
///
/// Header names are trimmed before matching. Canonical columns missing from the
/// source are filled with `None`; extra source columns are dropped. Rows shorter
/// than the header are padded, longer rows are rejected.
pub fn parse_dataset(kind: DatasetKind, bytes: &[u8]) -> ServiceResult<Dataset> {
    let dataset = kind.file_name();
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ServiceError::parse(dataset, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ServiceError::parse(dataset, "No columns to parse from file"));
    }

    let positions: Vec<(Column, Option<usize>)> = Column::ALL
        .iter()
        .map(|&column| {
            let position = headers
                .iter()
                .position(|h| column.headers().contains(&h.as_str()));
            (column, position)
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ServiceError::parse(dataset, e))?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(ServiceError::parse(
                dataset,
                format!(
                    "Expected {} fields in line {}, saw {}",
                    headers.len(),
                    line,
                    record.len()
                ),
            ));
        }

        let mut row = DatasetRow::default();
        for (column, position) in &positions {
            let cell = position
                .and_then(|i| record.get(i))
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);
            row.set(*column, cell);
        }
        rows.push(row);
    }

    Ok(Dataset::new(kind, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn parses_italian_headers_with_whitespace() {
        let csv = "Regione, Città ,Scuola,Mese,Settimana,Categoria piatto ,Piatto,Valore\n\
                   Lombardia,Milano,Rodari,Gen,1,Primi,Pasta,120\n";
        let dataset = parse_dataset(DatasetKind::Sales, csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 1);
        let row = &dataset.rows[0];
        assert_eq!(row.city.as_deref(), Some("Milano"));
        assert_eq!(row.category(), Some("Primi"));
        assert_eq!(row.numeric_value(), 120.0);
    }

    #[test]
    fn missing_columns_are_null_and_extras_dropped() {
        let csv = "Categoria,Valore,Note\nA,100,ignored\n";
        let dataset = parse_dataset(DatasetKind::Sales, csv.as_bytes()).unwrap();

        let row = &dataset.rows[0];
        assert_eq!(row.category(), Some("A"));
        assert_eq!(row.value.as_deref(), Some("100"));
        assert_eq!(row.region, None);
        assert_eq!(row.dish, None);
    }

    #[test]
    fn header_only_file_is_empty() {
        let dataset = parse_dataset(DatasetKind::TrayWaste, b"Categoria piatto,Valore\n").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let csv = "\u{feff}Categoria piatto,Valore\nA,1\n";
        let dataset = parse_dataset(DatasetKind::Sales, csv.as_bytes()).unwrap();
        assert_eq!(dataset.rows[0].category(), Some("A"));
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = "Categoria piatto,Piatto,Valore\nA,Pasta\n";
        let dataset = parse_dataset(DatasetKind::Sales, csv.as_bytes()).unwrap();
        assert_eq!(dataset.rows[0].dish.as_deref(), Some("Pasta"));
        assert_eq!(dataset.rows[0].value, None);
    }

    #[test]
    fn long_rows_are_rejected_with_dataset_name() {
        let csv = "Categoria piatto,Valore\nA,1,2\n";
        let err = parse_dataset(DatasetKind::PlateWaste, csv.as_bytes()).unwrap_err();
        assert_matches!(err, ServiceError::ParseError { ref dataset, .. } if dataset == "plate-waste.csv");
        assert!(err.to_string().contains("saw 3"));
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        let err = parse_dataset(DatasetKind::Sales, b"").unwrap_err();
        assert_matches!(err, ServiceError::ParseError { .. });
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());

        let dataset = store.load(DatasetKind::Sales).await.unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.kind, DatasetKind::Sales);
    }

    #[tokio::test]
    async fn saved_upload_is_loaded_back() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path().join("nested"));

        store
            .save_all(&[(DatasetKind::TrayWaste, b"Categoria piatto,Valore\nA,20\n".as_slice())])
            .await
            .unwrap();

        let raw = std::fs::read(store.path(DatasetKind::TrayWaste)).unwrap();
        assert_eq!(raw, b"Categoria piatto,Valore\nA,20\n");

        let dataset = store.load(DatasetKind::TrayWaste).await.unwrap();
        assert_eq!(dataset.rows[0].numeric_value(), 20.0);
        assert!(!store.staging_path(DatasetKind::TrayWaste).exists());
    }

    #[tokio::test]
    async fn failed_staging_write_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());
        store
            .save_all(&[(DatasetKind::Sales, b"Categoria,Valore\nA,1\n".as_slice())])
            .await
            .unwrap();

        // A directory in the staging slot makes the plate-waste write fail.
        std::fs::create_dir(store.staging_path(DatasetKind::PlateWaste)).unwrap();

        let result = store
            .save_all(&[
                (DatasetKind::Sales, b"Categoria,Valore\nB,2\n".as_slice()),
                (DatasetKind::TrayWaste, b"Categoria,Valore\nB,1\n".as_slice()),
                (DatasetKind::PlateWaste, b"Categoria,Valore\nB,1\n".as_slice()),
            ])
            .await;
        assert!(result.is_err());

        let sales = std::fs::read(store.path(DatasetKind::Sales)).unwrap();
        assert_eq!(sales, b"Categoria,Valore\nA,1\n");
        assert!(!store.path(DatasetKind::TrayWaste).exists());
        assert!(!store.staging_path(DatasetKind::Sales).exists());
        assert!(!store.staging_path(DatasetKind::TrayWaste).exists());
    }
}
