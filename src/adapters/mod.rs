use std::fs;
use std::path::Path;

use crate::core::chart::ChartOption;
use crate::core::schema::{FieldKey, FieldMapping};
use crate::domain::model::{CellValue, Record, RecordSet};
use crate::domain::ports::{ChartRenderer, RecordSource, Storage};
use crate::utils::error::{FaultEtlError, Result};

/// CSV 記錄來源。表頭取第一列（去空白），空儲存格轉為空值，
/// 數字樣式的儲存格轉為數值。
pub struct CsvFileSource {
    path: String,
}

impl CsvFileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvFileSource {
    fn read(&mut self) -> Result<RecordSet> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = Record::new();
            for (index, header) in headers.iter().enumerate() {
                let raw = row.get(index).unwrap_or("");
                record.set(header.clone(), parse_cell(raw));
            }
            records.push(record);
        }

        tracing::debug!(rows = records.len(), path = %self.path, "csv source loaded");
        Ok(RecordSet { headers, records })
    }
}

/// JSON 記錄來源：扁平物件的陣列。
/// JSON 沒有表頭列，欄序採各鍵首次出現的順序。
pub struct JsonFileSource {
    path: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn read(&mut self) -> Result<RecordSet> {
        let bytes = fs::read(&self.path)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;

        let serde_json::Value::Array(items) = value else {
            return Err(FaultEtlError::ProcessingError {
                message: format!("{}: expected a JSON array of records", self.path),
            });
        };

        let mut headers: Vec<String> = Vec::new();
        let mut records = Vec::new();

        for item in items {
            let serde_json::Value::Object(object) = item else {
                continue;
            };

            let mut record = Record::new();
            for (key, value) in object {
                let header = key.trim().to_string();
                if !headers.contains(&header) {
                    headers.push(header.clone());
                }
                record.set(header, cell_from_json(&value));
            }
            records.push(record);
        }

        tracing::debug!(rows = records.len(), path = %self.path, "json source loaded");
        Ok(RecordSet { headers, records })
    }
}

fn parse_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Text(raw.to_string()),
    }
}

fn cell_from_json(value: &serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::Null => CellValue::Empty,
        serde_json::Value::String(text) if text.trim().is_empty() => CellValue::Empty,
        serde_json::Value::String(text) => CellValue::Text(text.clone()),
        serde_json::Value::Number(number) => number
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(number.to_string())),
        other => CellValue::Text(other.to_string()),
    }
}

/// 本地檔案儲存
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 導出欄序：來源表頭在前，之後補上來源沒有的自動建立欄位
pub fn export_columns(headers: &[String], mapping: &FieldMapping) -> Vec<String> {
    let mut columns: Vec<String> = headers.to_vec();

    for key in FieldKey::OPTIONAL {
        let column = mapping.header_or_default(key);
        if !columns.iter().any(|existing| existing == column) {
            columns.push(column.to_string());
        }
    }

    columns
}

/// 結果導出器：按給定欄序把資料列寫成 CSV / JSON
pub struct DataExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> DataExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// CSV 導出。檔首寫入 UTF-8 BOM，試算表軟體才能正確識別中文。
    pub fn write_csv(&self, filename: &str, columns: &[String], rows: &[Record]) -> Result<()> {
        let mut buffer: Vec<u8> = vec![0xEF, 0xBB, 0xBF];

        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer.write_record(columns)?;
            for row in rows {
                let values: Vec<String> =
                    columns.iter().map(|column| row.display_of(column)).collect();
                writer.write_record(&values)?;
            }
            writer.flush()?;
        }

        self.storage.write_file(filename, &buffer)
    }

    pub fn write_json(&self, filename: &str, columns: &[String], rows: &[Record]) -> Result<()> {
        let mut output = Vec::with_capacity(rows.len());

        for row in rows {
            let mut object = serde_json::Map::new();
            for column in columns {
                let value = row
                    .get(column)
                    .map(|cell| serde_json::to_value(cell))
                    .transpose()?
                    .unwrap_or_else(|| serde_json::Value::String(String::new()));
                object.insert(column.clone(), value);
            }
            output.push(serde_json::Value::Object(object));
        }

        let bytes = serde_json::to_vec_pretty(&output)?;
        self.storage.write_file(filename, &bytes)
    }
}

/// 把圖表配置落地成 JSON 檔的渲染端，供外部圖表庫讀取
pub struct JsonFileChartRenderer<S: Storage> {
    storage: S,
    filename: String,
}

impl<S: Storage> JsonFileChartRenderer<S> {
    pub fn new(storage: S, filename: impl Into<String>) -> Self {
        Self {
            storage,
            filename: filename.into(),
        }
    }
}

impl<S: Storage> ChartRenderer for JsonFileChartRenderer<S> {
    fn apply_option(&mut self, option: &ChartOption) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(option)?;
        self.storage.write_file(&self.filename, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::SchemaResolver;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_csv_source_typed_cells() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "工单号,车间,等待时间h").unwrap();
        writeln!(file, "WO1,一车间,1.5").unwrap();
        writeln!(file, "WO2,,").unwrap();

        let set = CsvFileSource::new(file.path().to_string_lossy().to_string())
            .read()
            .unwrap();

        assert_eq!(set.headers, vec!["工单号", "车间", "等待时间h"]);
        assert_eq!(set.records.len(), 2);
        assert_eq!(
            set.records[0].get("等待时间h"),
            Some(&CellValue::Number(1.5))
        );
        assert_eq!(
            set.records[0].get("工单号"),
            Some(&CellValue::Text("WO1".to_string()))
        );
        assert_eq!(set.records[1].get("车间"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_json_source_first_seen_header_order() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            r#"[
                {"工单号": "WO1", "车间": "一车间"},
                {"工单号": "WO2", "车间": "二车间", "维修人": "王兴森"}
            ]"#
            .as_bytes(),
        )
        .unwrap();

        let set = JsonFileSource::new(file.path().to_string_lossy().to_string())
            .read()
            .unwrap();

        assert_eq!(set.records.len(), 2);
        assert!(set.headers.contains(&"维修人".to_string()));
        assert_eq!(
            set.records[0].get("工单号"),
            Some(&CellValue::Text("WO1".to_string()))
        );
    }

    #[test]
    fn test_json_source_rejects_non_array_payload() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(r#"{"工单号": "WO1"}"#.as_bytes()).unwrap();

        let result = JsonFileSource::new(file.path().to_string_lossy().to_string()).read();
        assert!(result.is_err());
    }

    #[test]
    fn test_export_columns_appends_missing_synthesized_columns() {
        let headers: Vec<String> = ["工单号", "车间", "区域"]
            .iter()
            .map(|header| header.to_string())
            .collect();
        let mapping = SchemaResolver::default().resolve(&headers);

        let columns = export_columns(&headers, &mapping);

        assert_eq!(
            columns,
            vec!["工单号", "车间", "区域", "维修人分类", "等待时间h", "维修时间h", "故障时间h"]
        );
    }

    #[test]
    fn test_csv_export_writes_bom_and_rows() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let exporter = DataExporter::new(storage.clone());

        let columns = vec!["工单号".to_string(), "等待时间h".to_string()];
        let mut row = Record::new();
        row.set("工单号", CellValue::from("WO1"));
        row.set("等待时间h", CellValue::Number(1.5));

        exporter.write_csv("out.csv", &columns, &[row]).unwrap();

        let bytes = storage.read_file("out.csv").unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("工单号,等待时间h"));
        assert!(text.contains("WO1,1.5"));
    }

    #[test]
    fn test_json_export_fills_missing_cells_with_empty_string() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let exporter = DataExporter::new(storage.clone());

        let columns = vec!["工单号".to_string(), "区域".to_string()];
        let mut row = Record::new();
        row.set("工单号", CellValue::from("WO1"));

        exporter.write_json("out.json", &columns, &[row]).unwrap();

        let bytes = storage.read_file("out.json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["工单号"], "WO1");
        assert_eq!(value[0]["区域"], "");
    }

    #[test]
    fn test_chart_renderer_writes_option_file() {
        use crate::core::pareto::ParetoView;

        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let mut renderer = JsonFileChartRenderer::new(storage.clone(), "chart.json");

        let view = ParetoView {
            level: 0,
            title: "按车间分类 - 等待时间h".to_string(),
            metric_label: "等待时间h".to_string(),
            breadcrumb: "全部".to_string(),
            total: 10.0,
            cutoff_index: Some(0),
            show_key_only: false,
            items: vec![],
        };
        let option = crate::core::chart::build_chart_option(&view);
        renderer.apply_option(&option).unwrap();

        let bytes = storage.read_file("chart.json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["title"]["text"], "按车间分类 - 等待时间h");
    }
}
