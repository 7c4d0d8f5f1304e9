use std::fmt::Write as _;

use clap::Parser;
use fault_etl::adapters::{
    export_columns, CsvFileSource, DataExporter, JsonFileChartRenderer, JsonFileSource,
    LocalStorage,
};
use fault_etl::core::pareto::ParetoView;
use fault_etl::domain::ports::RecordSource;
use fault_etl::utils::{logger, validation::Validate};
use fault_etl::{CliConfig, FaultEtlEngine, FaultEtlError, ParetoEngine, TomlConfig};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting fault-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證命令列配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 載入 TOML 設定檔（可覆蓋欄名、名冊與輸出設定）
    let toml_config = match &config.config {
        Some(path) => {
            let loaded = TomlConfig::from_file(path)?;
            if let Err(e) = loaded.validate() {
                tracing::error!("❌ Config file validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            loaded
        }
        None => TomlConfig::default(),
    };

    let columns = toml_config.columns();
    let rosters = toml_config.rosters();
    let output = toml_config.output.clone().unwrap_or_default();
    let output_path = output.path.unwrap_or_else(|| config.output_path.clone());
    let formats = output.formats.unwrap_or_else(|| config.formats.clone());

    // 依副檔名選擇記錄來源
    let mut source: Box<dyn RecordSource> = if config.input.to_lowercase().ends_with(".json") {
        Box::new(JsonFileSource::new(config.input.clone()))
    } else {
        Box::new(CsvFileSource::new(config.input.clone()))
    };

    let set = source.read()?;
    tracing::info!(
        "📂 Loaded {} records with {} columns from {}",
        set.len(),
        set.headers.len(),
        config.input
    );

    // 執行處理
    let mut engine = FaultEtlEngine::new(columns.clone(), rosters);
    let outcome = match engine.run(&set) {
        Ok(outcome) => outcome,
        Err(FaultEtlError::ValidationError { message, details }) => {
            eprintln!("✗ {}", message);
            for detail in &details {
                eprintln!("  - {}", detail);
            }
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &outcome.report.warnings {
        println!("⚠ {}", warning);
    }
    println!("{}", outcome.result.summary());
    if !outcome.deleted.is_empty() {
        tracing::info!("🗑 {} rows kept in deletion buckets for audit", outcome.deleted.len());
    }

    // 導出結果檔案
    let storage = LocalStorage::new(output_path.clone());
    let exporter = DataExporter::new(storage.clone());
    let export_order = export_columns(&set.headers, &outcome.mapping);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    for format in &formats {
        match format.as_str() {
            "csv" => {
                let filename = format!("设备故障统计_整理后数据_{}.csv", timestamp);
                exporter.write_csv(&filename, &export_order, &outcome.result.data)?;
                tracing::info!("📁 CSV output saved to: {}/{}", output_path, filename);
            }
            "json" => {
                let filename = format!("设备故障统计_整理后数据_{}.json", timestamp);
                exporter.write_json(&filename, &export_order, &outcome.result.data)?;
                tracing::info!("📁 JSON output saved to: {}/{}", output_path, filename);
            }
            other => tracing::warn!("Unknown export format skipped: {}", other),
        }
    }

    // 帕累托分析：落地圖表配置並輸出文字報告
    let mut pareto = ParetoEngine::new(columns);
    pareto.set_data(outcome.result.data.clone());
    pareto.switch_metric(config.metric);

    let chart_filename = format!("帕累托图_{}.json", timestamp);
    pareto.init_chart(Box::new(JsonFileChartRenderer::new(
        storage,
        chart_filename.clone(),
    )))?;
    tracing::info!("📊 Chart option saved to: {}/{}", output_path, chart_filename);

    let view = pareto.current_view();
    println!();
    print!("{}", build_text_report(&view));
    pareto.dispose();

    tracing::info!("✅ ETL process completed successfully!");
    println!("✅ 处理完成，输出目录: {}", output_path);

    Ok(())
}

/// 排名文字報告，★ 標記關鍵分組
fn build_text_report(view: &ParetoView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {}", view.title);
    let _ = writeln!(output, "{}", view.breadcrumb);

    if view.items.is_empty() {
        let _ = writeln!(output, "没有可统计的数据。");
        return output;
    }

    for item in view.rendered() {
        let marker = if item.is_key { "★" } else { " " };
        let _ = writeln!(
            output,
            "{} {:>2}. {}  {:.2}h  占比 {:.2}%  累计 {:.2}%",
            marker, item.rank, item.name, item.value, item.percentage, item.cumulative_percentage
        );
    }

    output
}
