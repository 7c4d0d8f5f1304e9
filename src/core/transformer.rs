use std::collections::HashSet;

use crate::config::columns::{RosterConfig, TOTAL_ROW_MARKER};
use crate::core::schema::{FieldKey, FieldMapping};
use crate::domain::model::{
    CellValue, DeletedRows, PersonType, Record, TransformResult, TransformStats, WorkingRow,
};
use crate::utils::dates;

/// 資料轉換管線。
///
/// 五個階段依固定順序執行，前一階段的輸出是下一階段的輸入，
/// 順序不可調換：分類須在讀取分列後車間值的消費者之前，
/// 時間計算須在刪除不完整列之前（兩者共用同一套有效性判定）。
/// 對缺失的可選欄位不會報錯，轉換時以標準欄名自動建立。
pub struct TransformPipeline {
    repair_workers: HashSet<String>,
    electricians: HashSet<String>,
    data: Vec<WorkingRow>,
    stats: TransformStats,
    deleted: DeletedRows,
}

impl TransformPipeline {
    pub fn new(rosters: RosterConfig) -> Self {
        Self {
            repair_workers: rosters.repair_workers.into_iter().collect(),
            electricians: rosters.electricians.into_iter().collect(),
            data: Vec::new(),
            stats: TransformStats::default(),
            deleted: DeletedRows::default(),
        }
    }

    /// 執行全部轉換。輸入會先被深拷貝，呼叫方的資料不受影響。
    ///
    /// 必需欄位的存在性由 RowValidator 把關，這裡不再檢查。
    pub fn transform(&mut self, records: &[Record], mapping: &FieldMapping) -> TransformResult {
        self.reset();
        self.data = records.to_vec();

        let input_rows = self.data.len();

        self.remove_total_rows(mapping);
        self.split_workshop_column(mapping);
        self.classify_repair_persons(mapping);
        self.calculate_times(mapping);
        self.remove_incomplete_time_rows(mapping);

        tracing::info!(
            input_rows,
            output_rows = self.data.len(),
            total_rows_removed = self.stats.total_rows_removed,
            incomplete_time_rows_removed = self.stats.incomplete_time_rows_removed,
            "transform finished"
        );

        TransformResult {
            data: self.data.clone(),
            stats: self.stats.clone(),
        }
    }

    /// 階段1：刪除車間欄為「合计」的彙總列
    fn remove_total_rows(&mut self, mapping: &FieldMapping) {
        let Some(workshop_key) = mapping.header(FieldKey::Workshop).map(str::to_string) else {
            return;
        };

        let initial_len = self.data.len();
        let mut kept = Vec::with_capacity(initial_len);

        for row in self.data.drain(..) {
            let is_total = row
                .get(&workshop_key)
                .map(|value| value.display() == TOTAL_ROW_MARKER)
                .unwrap_or(false);

            if is_total {
                self.deleted.total_rows.push(row);
            } else {
                kept.push(row);
            }
        }

        self.data = kept;
        self.stats.total_rows_removed = initial_len - self.data.len();
    }

    /// 階段2：車間分列。「车间-区域」格式拆成兩欄，
    /// 區域欄一律寫入（沒有分隔符時為空字串）。
    fn split_workshop_column(&mut self, mapping: &FieldMapping) {
        let Some(workshop_key) = mapping.header(FieldKey::Workshop).map(str::to_string) else {
            return;
        };
        let area_key = mapping.header_or_default(FieldKey::Area).to_string();

        for row in &mut self.data {
            let workshop_text = match row.get(&workshop_key) {
                Some(CellValue::Text(text)) => Some(text.clone()),
                _ => None,
            };

            match workshop_text {
                Some(text) if text.contains('-') => {
                    // 只在第一個分隔符處拆分
                    let mut parts = text.splitn(2, '-');
                    let workshop = parts.next().unwrap_or_default().trim().to_string();
                    let area = parts.next().unwrap_or_default().trim().to_string();

                    row.set(workshop_key.clone(), CellValue::Text(workshop));
                    row.set(area_key.clone(), CellValue::Text(area));
                }
                _ => {
                    let area_missing = row
                        .get(&area_key)
                        .map(CellValue::is_empty)
                        .unwrap_or(true);
                    if area_missing {
                        row.set(area_key.clone(), CellValue::Text(String::new()));
                    }
                }
            }
        }

        self.stats.workshop_column_split = true;
    }

    /// 階段3：依名冊把維修人分類為維修工、電工或未知
    fn classify_repair_persons(&mut self, mapping: &FieldMapping) {
        let Some(person_key) = mapping.header(FieldKey::RepairPerson).map(str::to_string) else {
            return;
        };
        let type_key = mapping
            .header_or_default(FieldKey::RepairPersonType)
            .to_string();

        for i in 0..self.data.len() {
            let name = self.data[i].display_of(&person_key);
            let person_type = self.classify(&name);
            self.data[i].set(type_key.clone(), CellValue::from(person_type.label()));
        }

        self.stats.repair_person_classified = true;
    }

    /// 名冊成員檢查。名單外與空名字一律歸為未知。
    pub fn classify(&self, name: &str) -> PersonType {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            PersonType::Unknown
        } else if self.repair_workers.contains(trimmed) {
            PersonType::RepairWorker
        } else if self.electricians.contains(trimmed) {
            PersonType::Electrician
        } else {
            PersonType::Unknown
        }
    }

    /// 階段4：計算等待、維修與故障時間（小時，保留2位小數）。
    /// 三個時間有任何一個解析失敗時，整列不寫入任何衍生欄位。
    fn calculate_times(&mut self, mapping: &FieldMapping) {
        let (Some(report_key), Some(start_key), Some(end_key)) = (
            mapping.header(FieldKey::ReportTime).map(str::to_string),
            mapping.header(FieldKey::StartTime).map(str::to_string),
            mapping.header(FieldKey::EndTime).map(str::to_string),
        ) else {
            return;
        };

        let wait_key = mapping.header_or_default(FieldKey::WaitTime).to_string();
        let repair_key = mapping.header_or_default(FieldKey::RepairTime).to_string();
        let fault_key = mapping.header_or_default(FieldKey::FaultTime).to_string();

        for row in &mut self.data {
            let report = row.get(&report_key).and_then(dates::parse_datetime);
            let start = row.get(&start_key).and_then(dates::parse_datetime);
            let end = row.get(&end_key).and_then(dates::parse_datetime);

            if let (Some(report), Some(start), Some(end)) = (report, start, end) {
                let wait_hours = dates::hours_between(report, start);
                let repair_hours = dates::hours_between(start, end);
                // 故障時間由未捨入的等待/維修值相加後一次捨入
                let fault_hours = wait_hours + repair_hours;

                row.set(wait_key.clone(), CellValue::Number(dates::round2(wait_hours)));
                row.set(
                    repair_key.clone(),
                    CellValue::Number(dates::round2(repair_hours)),
                );
                row.set(
                    fault_key.clone(),
                    CellValue::Number(dates::round2(fault_hours)),
                );
            }
        }
    }

    /// 階段5：刪除時間不完整的列。與階段4共用同一套有效性判定，
    /// 所以這個階段必須排在最後。
    fn remove_incomplete_time_rows(&mut self, mapping: &FieldMapping) {
        let (Some(report_key), Some(start_key), Some(end_key)) = (
            mapping.header(FieldKey::ReportTime).map(str::to_string),
            mapping.header(FieldKey::StartTime).map(str::to_string),
            mapping.header(FieldKey::EndTime).map(str::to_string),
        ) else {
            return;
        };

        let initial_len = self.data.len();
        let mut kept = Vec::with_capacity(initial_len);

        for row in self.data.drain(..) {
            let complete = [&report_key, &start_key, &end_key].iter().all(|key| {
                row.get(key)
                    .map(|value| !value.is_empty() && dates::is_valid_datetime(value))
                    .unwrap_or(false)
            });

            if complete {
                kept.push(row);
            } else {
                self.deleted.incomplete_time_rows.push(row);
            }
        }

        self.data = kept;
        self.stats.incomplete_time_rows_removed = initial_len - self.data.len();
    }

    /// 兩個刪除桶，供稽核介面顯示
    pub fn deleted_rows(&self) -> &DeletedRows {
        &self.deleted
    }

    pub fn stats(&self) -> &TransformStats {
        &self.stats
    }

    /// 回復到未執行前的狀態
    pub fn reset(&mut self) {
        self.data.clear();
        self.stats = TransformStats::default();
        self.deleted = DeletedRows::default();
    }
}
