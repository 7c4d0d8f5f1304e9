use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::model::CellValue;

/// 顯示與導出共用的日期時間格式
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 支援的日期時間輸入格式（依序嘗試）
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// Excel 序列日期的合理上限（對應 9999-12-31）
const EXCEL_SERIAL_MAX: f64 = 2_958_466.0;

/// 將儲存格值解析為日期時間。
///
/// 文字依 DATETIME_FORMATS / DATE_FORMATS 嘗試解析；
/// 數字視為 Excel 序列日期（自 1899-12-30 起的天數）。
pub fn parse_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(dt) => Some(*dt),
        CellValue::Number(n) => from_excel_serial(*n),
        CellValue::Text(text) => parse_datetime_str(text),
        CellValue::Empty => None,
    }
}

pub fn is_valid_datetime(value: &CellValue) -> bool {
    parse_datetime(value).is_some()
}

fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Excel 序列日期轉換。
/// 基準為 1899-12-30（Excel 誤將 1900 視為閏年，故不是 1900-01-01）。
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 || serial >= EXCEL_SERIAL_MAX {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// 兩個時間點之間的小時差（由毫秒差換算，未捨入）。
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let millis = (end - start).num_milliseconds();
    millis as f64 / 3_600_000.0
}

/// 四捨五入到 2 位小數（half away from zero）。
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}
