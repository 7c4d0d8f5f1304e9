use std::collections::HashMap;

use crate::config::columns::ColumnConfig;

/// 邏輯欄位鍵。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    WorkOrder,
    Workshop,
    RepairPerson,
    ReportTime,
    StartTime,
    EndTime,
    Area,
    RepairPersonType,
    WaitTime,
    RepairTime,
    FaultTime,
}

impl FieldKey {
    pub const REQUIRED: [FieldKey; 6] = [
        FieldKey::WorkOrder,
        FieldKey::Workshop,
        FieldKey::RepairPerson,
        FieldKey::ReportTime,
        FieldKey::StartTime,
        FieldKey::EndTime,
    ];

    pub const OPTIONAL: [FieldKey; 5] = [
        FieldKey::Area,
        FieldKey::RepairPersonType,
        FieldKey::WaitTime,
        FieldKey::RepairTime,
        FieldKey::FaultTime,
    ];

    pub const ALL: [FieldKey; 11] = [
        FieldKey::WorkOrder,
        FieldKey::Workshop,
        FieldKey::RepairPerson,
        FieldKey::ReportTime,
        FieldKey::StartTime,
        FieldKey::EndTime,
        FieldKey::Area,
        FieldKey::RepairPersonType,
        FieldKey::WaitTime,
        FieldKey::RepairTime,
        FieldKey::FaultTime,
    ];

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

/// 邏輯欄位到實際表頭的映射。
///
/// 缺席的欄位記為 None；可選欄位缺席屬於正常情況，
/// 轉換時以標準欄名自動建立。
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    headers: HashMap<FieldKey, Option<String>>,
    canonical: HashMap<FieldKey, String>,
}

impl FieldMapping {
    /// 實際映射到的表頭
    pub fn header(&self, key: FieldKey) -> Option<&str> {
        self.headers.get(&key).and_then(|header| header.as_deref())
    }

    pub fn is_mapped(&self, key: FieldKey) -> bool {
        self.header(key).is_some()
    }

    /// 映射到的表頭；未映射時回傳標準欄名（供自動建立欄位使用）
    pub fn header_or_default(&self, key: FieldKey) -> &str {
        self.header(key).unwrap_or_else(|| self.canonical_header(key))
    }

    pub fn canonical_header(&self, key: FieldKey) -> &str {
        self.canonical
            .get(&key)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// 必需欄位檢查結果
#[derive(Debug, Clone)]
pub struct RequiredCheck {
    pub ok: bool,
    pub missing: Vec<String>,
}

/// 純謂詞：回傳未映射的必需欄位的標準欄名。
/// 缺席是否致命由呼叫方決定。
pub fn check_required(mapping: &FieldMapping) -> RequiredCheck {
    let missing: Vec<String> = FieldKey::REQUIRED
        .iter()
        .filter(|key| !mapping.is_mapped(**key))
        .map(|key| mapping.canonical_header(*key).to_string())
        .collect();

    RequiredCheck {
        ok: missing.is_empty(),
        missing,
    }
}

/// 表頭解析器：把表頭列解析為欄位映射。
#[derive(Debug, Clone, Default)]
pub struct SchemaResolver {
    columns: ColumnConfig,
}

impl SchemaResolver {
    pub fn new(columns: ColumnConfig) -> Self {
        Self { columns }
    }

    /// 解析表頭。逐欄做去空白後的精確匹配，不產生副作用也不失敗。
    pub fn resolve(&self, headers: &[String]) -> FieldMapping {
        let mut mapping = FieldMapping::default();

        for key in FieldKey::ALL {
            let canonical = self.canonical(key);
            let found = headers
                .iter()
                .map(|header| header.trim())
                .find(|header| *header == canonical)
                .map(str::to_string);

            mapping.headers.insert(key, found);
            mapping.canonical.insert(key, canonical.to_string());
        }

        mapping
    }

    fn canonical(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::WorkOrder => &self.columns.work_order,
            FieldKey::Workshop => &self.columns.workshop,
            FieldKey::RepairPerson => &self.columns.repair_person,
            FieldKey::ReportTime => &self.columns.report_time,
            FieldKey::StartTime => &self.columns.start_time,
            FieldKey::EndTime => &self.columns.end_time,
            FieldKey::Area => &self.columns.area,
            FieldKey::RepairPersonType => &self.columns.repair_person_type,
            FieldKey::WaitTime => &self.columns.wait_time,
            FieldKey::RepairTime => &self.columns.repair_time,
            FieldKey::FaultTime => &self.columns.fault_time,
        }
    }
}
