use serde::Serialize;

use crate::core::pareto::ParetoView;

/// 關鍵分組（累計占比 80% 以內）的柱色
pub const KEY_COLOR: &str = "#5470c6";
/// 其餘分組的柱色
pub const NON_KEY_COLOR: &str = "#91cc75";
/// 累計百分比折線色
pub const LINE_COLOR: &str = "#ee6666";

const CUMULATIVE_SERIES_NAME: &str = "累计百分比";

/// 宣告式圖表配置，交給外部圖表庫渲染。
/// 只包含可序列化的部分；tooltip 文字格式化由前端自理。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: TitleOption,
    pub tooltip: TooltipOption,
    pub legend: LegendOption,
    pub grid: GridOption,
    pub x_axis: Vec<CategoryAxis>,
    pub y_axis: Vec<ValueAxis>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleOption {
    pub text: String,
    pub subtext: String,
    pub left: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOption {
    pub trigger: &'static str,
    pub axis_pointer: AxisPointer,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisPointer {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendOption {
    pub data: Vec<String>,
    pub top: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOption {
    pub left: &'static str,
    pub right: &'static str,
    pub bottom: &'static str,
    pub contain_label: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<String>,
    pub axis_label: AxisLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisLabel {
    pub interval: u32,
    pub rotate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub position: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Series {
    Bar(BarSeries),
    Line(LineSeries),
}

#[derive(Debug, Clone, Serialize)]
pub struct BarSeries {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub data: Vec<BarPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarPoint {
    pub value: f64,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub y_axis_index: u32,
    pub data: Vec<f64>,
    pub smooth: bool,
    pub symbol: &'static str,
    pub symbol_size: u32,
    pub line_style: LineStyle,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemStyle {
    pub color: &'static str,
}

/// 由聚合結果構建圖表配置：柱狀系列（按關鍵/非關鍵著色）
/// 加副軸上的累計百分比折線。
pub fn build_chart_option(view: &ParetoView) -> ChartOption {
    let rendered = view.rendered();

    let names: Vec<String> = rendered.iter().map(|item| item.name.clone()).collect();
    let bars: Vec<BarPoint> = rendered
        .iter()
        .map(|item| BarPoint {
            value: item.value,
            item_style: ItemStyle {
                color: if item.is_key { KEY_COLOR } else { NON_KEY_COLOR },
            },
        })
        .collect();
    let cumulative: Vec<f64> = rendered
        .iter()
        .map(|item| item.cumulative_percentage)
        .collect();

    ChartOption {
        title: TitleOption {
            text: view.title.clone(),
            subtext: view.breadcrumb.clone(),
            left: "center",
        },
        tooltip: TooltipOption {
            trigger: "axis",
            axis_pointer: AxisPointer { kind: "shadow" },
        },
        legend: LegendOption {
            data: vec![view.metric_label.clone(), CUMULATIVE_SERIES_NAME.to_string()],
            top: 40,
        },
        grid: GridOption {
            left: "3%",
            right: "4%",
            bottom: "15%",
            contain_label: true,
        },
        x_axis: vec![CategoryAxis {
            kind: "category",
            data: names,
            axis_label: AxisLabel {
                interval: 0,
                rotate: 45,
            },
        }],
        y_axis: vec![
            ValueAxis {
                kind: "value",
                name: view.metric_label.clone(),
                position: "left",
                max: None,
            },
            ValueAxis {
                kind: "value",
                name: "累计百分比(%)".to_string(),
                position: "right",
                max: Some(100),
            },
        ],
        series: vec![
            Series::Bar(BarSeries {
                kind: "bar",
                name: view.metric_label.clone(),
                data: bars,
            }),
            Series::Line(LineSeries {
                kind: "line",
                name: CUMULATIVE_SERIES_NAME,
                y_axis_index: 1,
                data: cumulative,
                smooth: true,
                symbol: "circle",
                symbol_size: 8,
                line_style: LineStyle {
                    color: LINE_COLOR,
                    width: 2,
                },
                item_style: ItemStyle { color: LINE_COLOR },
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pareto::ParetoItem;

    fn sample_view() -> ParetoView {
        ParetoView {
            level: 0,
            title: "按车间分类 - 等待时间h".to_string(),
            metric_label: "等待时间h".to_string(),
            breadcrumb: "全部".to_string(),
            total: 100.0,
            cutoff_index: Some(0),
            show_key_only: false,
            items: vec![
                ParetoItem {
                    name: "A".to_string(),
                    value: 80.0,
                    percentage: 80.0,
                    cumulative_percentage: 80.0,
                    rank: 1,
                    is_key: true,
                },
                ParetoItem {
                    name: "B".to_string(),
                    value: 20.0,
                    percentage: 20.0,
                    cumulative_percentage: 100.0,
                    rank: 2,
                    is_key: false,
                },
            ],
        }
    }

    #[test]
    fn test_series_lengths_match_rendered_groups() {
        let option = build_chart_option(&sample_view());

        assert_eq!(option.x_axis[0].data.len(), 2);
        match (&option.series[0], &option.series[1]) {
            (Series::Bar(bar), Series::Line(line)) => {
                assert_eq!(bar.data.len(), 2);
                assert_eq!(line.data, vec![80.0, 100.0]);
            }
            _ => panic!("unexpected series layout"),
        }
    }

    #[test]
    fn test_bar_colors_split_at_cutoff() {
        let option = build_chart_option(&sample_view());

        let Series::Bar(bar) = &option.series[0] else {
            panic!("expected bar series first");
        };
        assert_eq!(bar.data[0].item_style.color, KEY_COLOR);
        assert_eq!(bar.data[1].item_style.color, NON_KEY_COLOR);
    }

    #[test]
    fn test_option_serializes_in_chart_library_shape() {
        let option = build_chart_option(&sample_view());
        let json = serde_json::to_value(&option).unwrap();

        assert_eq!(json["series"][0]["type"], "bar");
        assert_eq!(json["series"][1]["type"], "line");
        assert_eq!(json["series"][1]["yAxisIndex"], 1);
        assert_eq!(json["yAxis"][1]["max"], 100);
        assert_eq!(json["title"]["subtext"], "全部");
        assert_eq!(json["xAxis"][0]["axisLabel"]["rotate"], 45);
    }
}
