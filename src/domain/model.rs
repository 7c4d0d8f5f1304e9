use chrono::NaiveDateTime;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::utils::dates;

/// 儲存格值。
///
/// 來源資料的每個儲存格都屬於這四種之一；空儲存格一律是 `Empty`，
/// 不存在 null/undefined 的情況。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Empty,
}

impl CellValue {
    /// 空值或純空白文字視為空
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// 數值強制轉換：數字直接回傳，數字樣式的文字解析後回傳
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// 字串化，用於比較與導出。整數值不帶小數點。
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Date(dt) => dates::format_datetime(*dt),
            CellValue::Empty => String::new(),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Date(dt) => serializer.serialize_str(&dates::format_datetime(*dt)),
            CellValue::Empty => serializer.serialize_str(""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// 一筆資料列：欄名（與表頭一致）到儲存格值的映射。
///
/// `clone()` 即為結構化深拷貝，刪除桶的快照依賴這一點。
#[derive(Debug, Clone, Default, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub cells: HashMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    pub fn set(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    pub fn contains(&self, header: &str) -> bool {
        self.cells.contains_key(header)
    }

    /// 欄位的字串表示；缺欄視為空字串
    pub fn display_of(&self, header: &str) -> String {
        self.get(header).map(CellValue::display).unwrap_or_default()
    }
}

/// 管線處理中的可變資料列，與 Record 同構。
pub type WorkingRow = Record;

/// 一次上傳的完整記錄集：表頭順序 + 資料列。
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 維修人員分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PersonType {
    RepairWorker,
    Electrician,
    Unknown,
}

impl PersonType {
    pub fn label(&self) -> &'static str {
        match self {
            PersonType::RepairWorker => "维修工",
            PersonType::Electrician => "电工",
            PersonType::Unknown => "未知",
        }
    }
}

/// 資料列被刪除的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionReason {
    /// 車間欄為「合计」的彙總列
    TotalRow,
    /// 三個時間欄位不完整或無法解析
    IncompleteTime,
}

/// 刪除稽核記錄：被刪列的深拷貝與原因
#[derive(Debug, Clone, Serialize)]
pub struct DeletionRecord {
    pub row: WorkingRow,
    pub reason: DeletionReason,
}

/// 兩個刪除桶，供「顯示已刪除列」的介面使用
#[derive(Debug, Clone, Default)]
pub struct DeletedRows {
    pub total_rows: Vec<WorkingRow>,
    pub incomplete_time_rows: Vec<WorkingRow>,
}

impl DeletedRows {
    pub fn len(&self) -> usize {
        self.total_rows.len() + self.incomplete_time_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows.is_empty() && self.incomplete_time_rows.is_empty()
    }

    /// 攤平為帶原因的稽核記錄
    pub fn records(&self) -> Vec<DeletionRecord> {
        let mut records = Vec::with_capacity(self.len());
        for row in &self.total_rows {
            records.push(DeletionRecord {
                row: row.clone(),
                reason: DeletionReason::TotalRow,
            });
        }
        for row in &self.incomplete_time_rows {
            records.push(DeletionRecord {
                row: row.clone(),
                reason: DeletionReason::IncompleteTime,
            });
        }
        records
    }
}

/// 轉換統計。計數單調遞增，每次 transform 產生一次。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformStats {
    pub total_rows_removed: usize,
    pub incomplete_time_rows_removed: usize,
    pub workshop_column_split: bool,
    pub repair_person_classified: bool,
}

/// 轉換結果：增補後的資料列與統計
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub data: Vec<WorkingRow>,
    pub stats: TransformStats,
}

impl TransformResult {
    /// 處理摘要文字
    pub fn summary(&self) -> String {
        let mut summary = String::from("数据处理完成\n");
        summary.push_str(&format!("- 处理后数据行数: {}\n", self.data.len()));
        summary.push_str(&format!(
            "- 删除\"合计\"行: {} 行\n",
            self.stats.total_rows_removed
        ));
        summary.push_str(&format!(
            "- 删除时间不完整行: {} 行\n",
            self.stats.incomplete_time_rows_removed
        ));
        summary.push_str(&format!(
            "- 车间列分列: {}\n",
            if self.stats.workshop_column_split {
                "已完成"
            } else {
                "跳过"
            }
        ));
        summary.push_str(&format!(
            "- 维修人分类: {}",
            if self.stats.repair_person_classified {
                "已完成"
            } else {
                "跳过"
            }
        ));
        summary
    }
}

/// 驗證結果。errors 非空即視為不可處理。
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 驗證摘要文字
    pub fn summary(&self) -> String {
        if self.valid {
            let mut summary = String::from("✓ 数据验证通过");
            if self.warning_count() > 0 {
                summary.push_str(&format!("\n⚠ {} 个警告", self.warning_count()));
            }
            summary
        } else {
            format!("✗ 数据验证失败\n{} 个错误", self.error_count())
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 5)?;
        state.serialize_field("valid", &self.valid)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.serialize_field("errorCount", &self.error_count())?;
        state.serialize_field("warningCount", &self.warning_count())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_emptiness() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text("   ".to_string()).is_empty());
        assert!(!CellValue::Text("一车间".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(3.0).display(), "3");
        assert_eq!(CellValue::Number(3.25).display(), "3.25");
        assert_eq!(CellValue::Text("WO1".to_string()).display(), "WO1");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_cell_value_numeric_coercion() {
        assert_eq!(CellValue::Number(1.5).as_number(), Some(1.5));
        assert_eq!(CellValue::Text(" 2.5 ".to_string()).as_number(), Some(2.5));
        assert_eq!(CellValue::Text("abc".to_string()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn test_record_clone_is_deep() {
        let mut row = Record::new();
        row.set("车间", CellValue::from("一车间"));

        let snapshot = row.clone();
        row.set("车间", CellValue::from("二车间"));

        assert_eq!(snapshot.display_of("车间"), "一车间");
        assert_eq!(row.display_of("车间"), "二车间");
    }

    #[test]
    fn test_validation_report_summary() {
        let passed = ValidationReport {
            valid: true,
            errors: vec![],
            warnings: vec!["发现 2 行工单号为空".to_string()],
        };
        assert!(passed.summary().contains("数据验证通过"));
        assert!(passed.summary().contains("1 个警告"));

        let failed = ValidationReport {
            valid: false,
            errors: vec!["缺少必需列: 工单号".to_string()],
            warnings: vec![],
        };
        assert!(failed.summary().contains("1 个错误"));
    }
}
