use crate::core::chart::ChartOption;
use crate::domain::model::RecordSet;
use crate::utils::error::Result;

/// 記錄來源。試算表編解碼由外部提供，核心只要求拿到
/// 依表頭命名、保持欄序的記錄集。
pub trait RecordSource {
    fn read(&mut self) -> Result<RecordSet>;
}

/// 輸出儲存
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// 圖表渲染端。外部圖表庫接受宣告式的 option 物件；
/// 點擊事件由外部回呼 ParetoEngine 的 on_bar_selected。
pub trait ChartRenderer {
    fn apply_option(&mut self, option: &ChartOption) -> Result<()>;
}
