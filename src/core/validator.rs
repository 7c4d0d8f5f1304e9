use crate::core::schema::{check_required, FieldKey, FieldMapping};
use crate::domain::model::{CellValue, Record, ValidationReport};
use crate::utils::dates;

/// 資料就緒檢查。只讀取來源記錄，不做任何修改；
/// 同樣的輸入永遠得到同樣的結果。
///
/// 錯誤會阻止後續處理，警告僅供參考。列級異常彙總成
/// 單一警告句，避免大資料集產生成千上萬條警告。
#[derive(Debug, Clone, Copy, Default)]
pub struct RowValidator;

impl RowValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, records: &[Record], mapping: &FieldMapping) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if records.is_empty() {
            errors.push("数据为空：没有可处理的数据行".to_string());
            return ValidationReport {
                valid: false,
                errors,
                warnings,
            };
        }

        // 每個缺失的必需欄位各產生一條錯誤
        let check = check_required(mapping);
        for column in &check.missing {
            errors.push(format!("缺少必需列: {}", column));
        }

        self.scan_rows(records, mapping, &mut warnings);

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// 逐列統計異常並彙總為警告
    fn scan_rows(&self, records: &[Record], mapping: &FieldMapping, warnings: &mut Vec<String>) {
        let mut empty_work_order_count = 0usize;
        let mut missing_time_count = 0usize;
        let mut invalid_date_count = 0usize;

        for record in records {
            if cell_of(record, mapping, FieldKey::WorkOrder)
                .map(CellValue::is_empty)
                .unwrap_or(true)
            {
                empty_work_order_count += 1;
            }

            let report_time = cell_of(record, mapping, FieldKey::ReportTime);
            let start_time = cell_of(record, mapping, FieldKey::StartTime);
            let end_time = cell_of(record, mapping, FieldKey::EndTime);

            let all_present = [report_time, start_time, end_time]
                .iter()
                .all(|cell| cell.map(|value| !value.is_empty()).unwrap_or(false));

            if !all_present {
                missing_time_count += 1;
            } else {
                // 三個時間都在場時才逐一檢查格式
                for cell in [report_time, start_time, end_time].into_iter().flatten() {
                    if !dates::is_valid_datetime(cell) {
                        invalid_date_count += 1;
                    }
                }
            }
        }

        tracing::debug!(
            empty_work_orders = empty_work_order_count,
            missing_times = missing_time_count,
            invalid_dates = invalid_date_count,
            "row scan finished"
        );

        if empty_work_order_count > 0 {
            warnings.push(format!("发现 {} 行工单号为空", empty_work_order_count));
        }

        if missing_time_count > 0 {
            warnings.push(format!(
                "发现 {} 行时间数据不完整（将在处理时删除）",
                missing_time_count
            ));
        }

        if invalid_date_count > 0 {
            warnings.push(format!("发现 {} 个无效日期格式", invalid_date_count));
        }
    }
}

fn cell_of<'a>(record: &'a Record, mapping: &FieldMapping, key: FieldKey) -> Option<&'a CellValue> {
    mapping.header(key).and_then(|header| record.get(header))
}
