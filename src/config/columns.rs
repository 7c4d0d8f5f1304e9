use serde::{Deserialize, Serialize};

/// 需要刪除的彙總列標識
pub const TOTAL_ROW_MARKER: &str = "合计";

/// 未知分組 / 未知維修人分類
pub const UNKNOWN_LABEL: &str = "未知";

/// 邏輯欄位對應的標準欄名。
///
/// 前六個為必需欄位，缺一不可處理；其餘為可選欄位，
/// 原始資料沒有時由轉換管線自動建立。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub work_order: String,
    pub workshop: String,
    pub repair_person: String,
    pub report_time: String,
    pub start_time: String,
    pub end_time: String,
    pub area: String,
    pub repair_person_type: String,
    pub wait_time: String,
    pub repair_time: String,
    pub fault_time: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            work_order: "工单号".to_string(),
            workshop: "车间".to_string(),
            repair_person: "维修人".to_string(),
            report_time: "报修时间".to_string(),
            start_time: "维修开始时间".to_string(),
            end_time: "维修结束时间".to_string(),
            area: "区域".to_string(),
            repair_person_type: "维修人分类".to_string(),
            wait_time: "等待时间h".to_string(),
            repair_time: "维修时间h".to_string(),
            fault_time: "故障时间h".to_string(),
        }
    }
}

/// 人員名冊。維修工與電工兩份名單互斥。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub repair_workers: Vec<String>,
    pub electricians: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            // 維修工名單（16人）
            repair_workers: [
                "王兴森", "孙长青", "徐阴海", "任扶民", "吴长振", "张玉柱", "刘志强", "杨明印",
                "张金华", "刘金财", "崔树立", "杨致敬", "马圣强", "刘子凯", "何洪杰", "刘佳文",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            // 電工名單（14人）
            electricians: [
                "李润海", "赵艳伟", "吴霄", "吴忠建", "李之彦", "宋桂良", "崔金辉", "李瑞召",
                "万庆权", "郭瑞臣", "郭兆勤", "赵同宽", "肖木凯", "赵燕伟",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_roster_sizes() {
        let rosters = RosterConfig::default();
        assert_eq!(rosters.repair_workers.len(), 16);
        assert_eq!(rosters.electricians.len(), 14);
    }

    #[test]
    fn test_default_rosters_are_disjoint() {
        let rosters = RosterConfig::default();
        let workers: HashSet<&String> = rosters.repair_workers.iter().collect();
        assert!(rosters.electricians.iter().all(|name| !workers.contains(name)));
    }

    #[test]
    fn test_default_columns() {
        let columns = ColumnConfig::default();
        assert_eq!(columns.work_order, "工单号");
        assert_eq!(columns.workshop, "车间");
        assert_eq!(columns.wait_time, "等待时间h");
    }
}
