pub mod columns;
pub mod toml_config;

pub use columns::{ColumnConfig, RosterConfig};
pub use toml_config::TomlConfig;

use crate::core::pareto::Metric;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "fault-etl")]
#[command(about = "设备故障统计数据处理：维修记录清洗与帕累托分析")]
pub struct CliConfig {
    /// 輸入檔案（.csv 或 .json 記錄集）
    pub input: String,

    /// TOML 設定檔，可覆蓋欄名、人員名冊與輸出設定
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// 導出格式，逗號分隔（csv,json）
    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub formats: Vec<String>,

    /// 帕累托分析指標（waitTime / repairTime / faultTime）
    #[arg(long, default_value = "waitTime")]
    pub metric: Metric,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("input", &self.input)?;
        validation::validate_file_extensions("input", &[self.input.clone()], &["csv", "json"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        Ok(())
    }
}
