use std::fmt;
use std::str::FromStr;

use crate::config::columns::{ColumnConfig, UNKNOWN_LABEL};
use crate::core::chart;
use crate::domain::model::WorkingRow;
use crate::domain::ports::ChartRenderer;
use crate::utils::error::Result;
use serde::Serialize;

/// 累計占比達到此閾值的分組構成「關鍵少數」
pub const PARETO_THRESHOLD: f64 = 80.0;

/// 鑽取層級。固定四層，每層指定分組用的表頭。
#[derive(Debug, Clone, Copy)]
pub struct HierarchyLevel {
    pub name: &'static str,
    pub field: &'static str,
    pub title: &'static str,
}

pub const HIERARCHY_LEVELS: [HierarchyLevel; 4] = [
    HierarchyLevel {
        name: "车间",
        field: "车间",
        title: "按车间分类",
    },
    HierarchyLevel {
        name: "设备",
        field: "设备名称",
        title: "按设备分类",
    },
    HierarchyLevel {
        name: "设备编号",
        field: "设备编号",
        title: "按设备编号分类",
    },
    HierarchyLevel {
        name: "失效类型",
        field: "故障类型",
        title: "按失效类型分类",
    },
];

/// 分析指標
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    WaitTime,
    RepairTime,
    FaultTime,
}

impl Metric {
    pub fn token(&self) -> &'static str {
        match self {
            Metric::WaitTime => "waitTime",
            Metric::RepairTime => "repairTime",
            Metric::FaultTime => "faultTime",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "waitTime" => Ok(Metric::WaitTime),
            "repairTime" => Ok(Metric::RepairTime),
            "faultTime" => Ok(Metric::FaultTime),
            other => Err(format!(
                "invalid metric: {} (valid: waitTime, repairTime, faultTime)",
                other
            )),
        }
    }
}

/// 單個分組的帕累托統計，每次渲染重新推導
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoItem {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
    pub cumulative_percentage: f64,
    pub rank: usize,
    pub is_key: bool,
}

/// 導航棧幀：鑽取前的層級與篩選條件快照
#[derive(Debug, Clone)]
pub struct NavigationFrame {
    pub level: usize,
    pub filters: Vec<(String, String)>,
}

/// 一次聚合的完整結果，圖表配置由此構建
#[derive(Debug, Clone)]
pub struct ParetoView {
    pub level: usize,
    pub title: String,
    pub metric_label: String,
    pub breadcrumb: String,
    pub total: f64,
    pub cutoff_index: Option<usize>,
    pub show_key_only: bool,
    pub items: Vec<ParetoItem>,
}

impl ParetoView {
    /// 依顯示模式截取的渲染集
    pub fn rendered(&self) -> &[ParetoItem] {
        match (self.show_key_only, self.cutoff_index) {
            (true, Some(cutoff)) if !self.items.is_empty() => {
                &self.items[..=cutoff.min(self.items.len() - 1)]
            }
            _ => &self.items,
        }
    }
}

/// 分層帕累托分析引擎。
///
/// 持有轉換後的資料列快照（只讀，不修改），在四個固定層級上
/// 聚合出 80/20 分析，並維護鑽取導航狀態。圖表渲染端由引擎
/// 顯式持有：initChart 建立、dispose 銷毀，不經全域變數。
/// 每次狀態變更都對當前條件重新完整聚合，沒有增量快取。
pub struct ParetoEngine {
    columns: ColumnConfig,
    data: Vec<WorkingRow>,
    level: usize,
    filters: Vec<(String, String)>,
    navigation_stack: Vec<NavigationFrame>,
    metric: Metric,
    show_key_only: bool,
    renderer: Option<Box<dyn ChartRenderer>>,
}

impl ParetoEngine {
    pub fn new(columns: ColumnConfig) -> Self {
        Self {
            columns,
            data: Vec::new(),
            level: 0,
            filters: Vec::new(),
            navigation_stack: Vec::new(),
            metric: Metric::WaitTime,
            show_key_only: false,
            renderer: None,
        }
    }

    /// 替換底層資料並回到初始狀態（含指標）
    pub fn set_data(&mut self, data: Vec<WorkingRow>) {
        self.data = data;
        self.level = 0;
        self.filters.clear();
        self.navigation_stack.clear();
        self.metric = Metric::WaitTime;
        self.show_key_only = false;
        self.refresh();
    }

    /// 接上圖表渲染端並立即渲染當前視圖
    pub fn init_chart(&mut self, renderer: Box<dyn ChartRenderer>) -> Result<()> {
        self.renderer = Some(renderer);
        self.render()
    }

    /// 釋放圖表渲染端
    pub fn dispose(&mut self) {
        self.renderer = None;
    }

    /// 鑽取：把選中的分組固定為篩選條件並下探一層。
    /// 已在最深層或名稱為空白時靜默忽略（點到非資料元素的保護）。
    pub fn on_bar_selected(&mut self, selected_name: &str) {
        let name = selected_name.trim();
        if self.level >= HIERARCHY_LEVELS.len() - 1 || name.is_empty() {
            tracing::debug!(level = self.level, name, "drill-down ignored");
            return;
        }

        self.navigation_stack.push(NavigationFrame {
            level: self.level,
            filters: self.filters.clone(),
        });

        let field = HIERARCHY_LEVELS[self.level].field.to_string();
        self.filters.push((field, name.to_string()));
        self.level += 1;
        self.refresh();
    }

    /// 返回上一級；已在根層時無事發生
    pub fn go_back(&mut self) {
        let Some(frame) = self.navigation_stack.pop() else {
            return;
        };
        self.level = frame.level;
        self.filters = frame.filters;
        self.refresh();
    }

    /// 回到初始狀態。指標是顯示偏好而非導航狀態，保持不變。
    pub fn reset(&mut self) {
        self.level = 0;
        self.filters.clear();
        self.navigation_stack.clear();
        self.show_key_only = false;
        self.refresh();
    }

    pub fn switch_metric(&mut self, metric: Metric) {
        self.metric = metric;
        self.refresh();
    }

    /// 字串形式的指標切換；無效名稱靜默忽略
    pub fn switch_metric_named(&mut self, name: &str) {
        match Metric::from_str(name) {
            Ok(metric) => self.switch_metric(metric),
            Err(_) => tracing::debug!(name, "metric switch ignored"),
        }
    }

    pub fn toggle_key_only(&mut self) {
        self.show_key_only = !self.show_key_only;
        self.refresh();
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn show_key_only(&self) -> bool {
        self.show_key_only
    }

    pub fn navigation_depth(&self) -> usize {
        self.navigation_stack.len()
    }

    /// 麵包屑導航文字
    pub fn breadcrumb(&self) -> String {
        let mut parts = vec!["全部".to_string()];
        for (_, value) in &self.filters {
            parts.push(value.clone());
        }
        parts.join(" > ")
    }

    /// 對當前狀態完整聚合
    pub fn current_view(&self) -> ParetoView {
        let level_info = &HIERARCHY_LEVELS[self.level];
        let metric_label = self.metric_field().to_string();

        let groups = self.aggregate(level_info.field);
        let (items, total, cutoff_index) = calculate_pareto(groups);

        ParetoView {
            level: self.level,
            title: format!("{} - {}", level_info.title, metric_label),
            metric_label,
            breadcrumb: self.breadcrumb(),
            total,
            cutoff_index,
            show_key_only: self.show_key_only,
            items,
        }
    }

    /// 指標對應的表頭（轉換管線寫入的衍生欄位）
    fn metric_field(&self) -> &str {
        match self.metric {
            Metric::WaitTime => &self.columns.wait_time,
            Metric::RepairTime => &self.columns.repair_time,
            Metric::FaultTime => &self.columns.fault_time,
        }
    }

    /// 套用篩選並按分組欄求和。分組鍵缺失或為空時歸入「未知」，
    /// 分組按首次出現的順序收集。
    fn aggregate(&self, group_field: &str) -> Vec<(String, f64)> {
        let metric_field = self.metric_field();
        let mut groups: Vec<(String, f64)> = Vec::new();
        let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

        for row in self.data.iter().filter(|row| self.matches_filters(row)) {
            let raw_key = row.display_of(group_field);
            let key = raw_key.trim();
            let key = if key.is_empty() { UNKNOWN_LABEL } else { key };

            let value = row
                .get(metric_field)
                .and_then(|cell| cell.as_number())
                .unwrap_or(0.0);

            match index.get(key) {
                Some(&position) => groups[position].1 += value,
                None => {
                    index.insert(key.to_string(), groups.len());
                    groups.push((key.to_string(), value));
                }
            }
        }

        groups
    }

    /// 篩選條件的合取。比較前先字串化並去空白，
    /// 同一值的數字與文字表示也能匹配。
    fn matches_filters(&self, row: &WorkingRow) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| row.display_of(field).trim() == value.as_str())
    }

    fn refresh(&mut self) {
        if let Err(e) = self.render() {
            tracing::error!("chart render failed: {}", e);
        }
    }

    fn render(&mut self) -> Result<()> {
        if self.renderer.is_none() || self.data.is_empty() {
            return Ok(());
        }

        let view = self.current_view();
        let option = chart::build_chart_option(&view);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.apply_option(&option)?;
        }
        Ok(())
    }
}

/// 降冪排序並計算累計占比與關鍵分組切點。
///
/// 排序使用穩定排序，總和相等的分組維持首次出現的順序。
/// 累計以未捨入的中間值推進，只在顯示值上捨入到 2 位小數。
/// 總和為 0 時（0/0）占比一律取 0，不產生 NaN，也沒有關鍵分組。
fn calculate_pareto(mut groups: Vec<(String, f64)>) -> (Vec<ParetoItem>, f64, Option<usize>) {
    use crate::utils::dates::round2;

    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = groups.iter().map(|(_, value)| value).sum();

    let mut cumulative = 0.0;
    let mut cutoff_index = None;
    let mut items = Vec::with_capacity(groups.len());

    for (position, (name, value)) in groups.into_iter().enumerate() {
        cumulative += value;

        let (percentage, cumulative_percentage) = if total > 0.0 {
            (value / total * 100.0, cumulative / total * 100.0)
        } else {
            (0.0, 0.0)
        };

        if cutoff_index.is_none() && total > 0.0 && cumulative_percentage >= PARETO_THRESHOLD {
            cutoff_index = Some(position);
        }

        items.push(ParetoItem {
            name,
            value,
            percentage: round2(percentage),
            cumulative_percentage: round2(cumulative_percentage),
            rank: position + 1,
            is_key: false,
        });
    }

    if let Some(cutoff) = cutoff_index {
        for item in items.iter_mut().take(cutoff + 1) {
            item.is_key = true;
        }
    }

    (items, total, cutoff_index)
}
