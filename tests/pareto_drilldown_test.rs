use std::io::Write;

use fault_etl::adapters::{CsvFileSource, JsonFileChartRenderer, LocalStorage};
use fault_etl::core::pareto::Metric;
use fault_etl::domain::ports::{RecordSource, Storage};
use fault_etl::{ColumnConfig, FaultEtlEngine, ParetoEngine, RosterConfig};
use tempfile::{tempdir, NamedTempFile};

/// 準備一份經過完整轉換的資料列：兩個車間、多台設備
fn transformed_rows() -> Vec<fault_etl::domain::model::WorkingRow> {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "工单号,车间,维修人,报修时间,维修开始时间,维修结束时间,设备名称,设备编号,故障类型"
    )
    .unwrap();
    // 一车间：设备A 等待 8h（4h+4h），设备B 等待 1h
    writeln!(
        file,
        "WO1,一车间,王兴森,2024-01-01 00:00,2024-01-01 04:00,2024-01-01 05:00,设备A,A-01,磨损"
    )
    .unwrap();
    writeln!(
        file,
        "WO2,一车间,王兴森,2024-01-02 00:00,2024-01-02 04:00,2024-01-02 05:00,设备A,A-02,漏油"
    )
    .unwrap();
    writeln!(
        file,
        "WO3,一车间,李润海,2024-01-03 00:00,2024-01-03 01:00,2024-01-03 02:00,设备B,B-01,松动"
    )
    .unwrap();
    // 二车间：设备C 等待 2h
    writeln!(
        file,
        "WO4,二车间,李润海,2024-01-04 00:00,2024-01-04 02:00,2024-01-04 03:00,设备C,C-01,磨损"
    )
    .unwrap();

    let set = CsvFileSource::new(file.path().to_string_lossy().to_string())
        .read()
        .unwrap();
    let mut engine = FaultEtlEngine::new(ColumnConfig::default(), RosterConfig::default());
    engine.run(&set).unwrap().result.data
}

fn pareto() -> ParetoEngine {
    let mut engine = ParetoEngine::new(ColumnConfig::default());
    engine.set_data(transformed_rows());
    engine
}

#[test]
fn test_top_level_aggregation_over_transformed_rows() {
    let view = pareto().current_view();

    // 一车间 9h，二车间 2h
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].name, "一车间");
    assert_eq!(view.items[0].value, 9.0);
    assert_eq!(view.items[1].name, "二车间");
    assert_eq!(view.items[1].value, 2.0);

    // 一车间 81.82% 已跨過 80% 閾值
    assert_eq!(view.cutoff_index, Some(0));
    assert!(view.items[0].is_key);
    assert!(!view.items[1].is_key);
    assert!((view.items[1].cumulative_percentage - 100.0).abs() < 0.01);
}

#[test]
fn test_drill_down_then_back_restores_root() {
    let mut engine = pareto();

    engine.on_bar_selected("一车间");
    assert_eq!(engine.level(), 1);

    let drilled = engine.current_view();
    assert_eq!(drilled.breadcrumb, "全部 > 一车间");
    assert_eq!(drilled.items.len(), 2);
    assert_eq!(drilled.items[0].name, "设备A");
    assert_eq!(drilled.items[0].value, 8.0);

    engine.on_bar_selected("设备A");
    assert_eq!(engine.level(), 2);
    let by_id = engine.current_view();
    assert_eq!(by_id.items.len(), 2);

    engine.go_back();
    engine.go_back();

    assert_eq!(engine.level(), 0);
    assert!(engine.filters().is_empty());
    assert_eq!(engine.current_view().items.len(), 2);
}

#[test]
fn test_metric_switch_survives_reset() {
    let mut engine = pareto();

    engine.switch_metric(Metric::RepairTime);
    engine.on_bar_selected("一车间");
    engine.reset();

    assert_eq!(engine.metric(), Metric::RepairTime);
    assert_eq!(engine.level(), 0);

    // 維修時間：一车间 3h（1+1+1），二车间 1h
    let view = engine.current_view();
    assert_eq!(view.items[0].value, 3.0);
    assert_eq!(view.items[1].value, 1.0);
}

#[test]
fn test_drill_beyond_deepest_level_is_ignored() {
    let mut engine = pareto();

    engine.on_bar_selected("一车间");
    engine.on_bar_selected("设备A");
    engine.on_bar_selected("A-01");
    assert_eq!(engine.level(), 3);

    let deepest = engine.current_view();
    assert_eq!(deepest.items.len(), 1);
    assert_eq!(deepest.items[0].name, "磨损");

    engine.on_bar_selected("磨损");
    assert_eq!(engine.level(), 3);
}

#[test]
fn test_unmatched_filter_renders_empty_chart() {
    let mut engine = pareto();

    engine.on_bar_selected("不存在的车间");

    let view = engine.current_view();
    assert!(view.items.is_empty());
    assert_eq!(view.total, 0.0);
    assert_eq!(view.cutoff_index, None);
}

#[test]
fn test_chart_option_written_through_renderer() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());

    let mut engine = pareto();
    engine
        .init_chart(Box::new(JsonFileChartRenderer::new(
            storage.clone(),
            "chart.json",
        )))
        .unwrap();

    // 初次掛接即渲染當前視圖
    let bytes = storage.read_file("chart.json").unwrap();
    let option: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(option["series"][0]["type"], "bar");
    assert_eq!(option["xAxis"][0]["data"][0], "一车间");

    // 鑽取後重新渲染，落地的配置跟著更新
    engine.on_bar_selected("一车间");
    let bytes = storage.read_file("chart.json").unwrap();
    let option: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(option["title"]["subtext"], "全部 > 一车间");
    assert_eq!(option["xAxis"][0]["data"][0], "设备A");

    engine.dispose();
}

#[test]
fn test_key_only_mode_truncates_rendered_series() {
    let mut engine = pareto();

    engine.toggle_key_only();
    let view = engine.current_view();

    assert_eq!(view.items.len(), 2);
    assert_eq!(view.rendered().len(), 1);
    assert_eq!(view.rendered()[0].name, "一车间");

    let option = fault_etl::core::chart::build_chart_option(&view);
    let json = serde_json::to_value(&option).unwrap();
    assert_eq!(json["xAxis"][0]["data"].as_array().unwrap().len(), 1);
}
