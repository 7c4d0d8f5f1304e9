use crate::config::columns::{ColumnConfig, RosterConfig};
use crate::core::schema::{FieldMapping, SchemaResolver};
use crate::core::transformer::TransformPipeline;
use crate::core::validator::RowValidator;
use crate::domain::model::{DeletedRows, RecordSet, TransformResult, ValidationReport};
use crate::utils::error::{FaultEtlError, Result};

/// 一次完整處理的產出
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub mapping: FieldMapping,
    pub report: ValidationReport,
    pub result: TransformResult,
    pub deleted: DeletedRows,
}

/// 處理引擎：解析表頭、驗證、轉換，依序串起核心元件。
pub struct FaultEtlEngine {
    resolver: SchemaResolver,
    validator: RowValidator,
    transformer: TransformPipeline,
}

impl FaultEtlEngine {
    pub fn new(columns: ColumnConfig, rosters: RosterConfig) -> Self {
        Self {
            resolver: SchemaResolver::new(columns),
            validator: RowValidator::new(),
            transformer: TransformPipeline::new(rosters),
        }
    }

    /// 執行處理。結構性錯誤（空資料、缺必需列）以單一彙總錯誤
    /// 返回，細節清單附在錯誤裡；警告不阻止處理。
    pub fn run(&mut self, set: &RecordSet) -> Result<EtlOutcome> {
        tracing::info!(rows = set.len(), columns = set.headers.len(), "resolving schema");
        let mapping = self.resolver.resolve(&set.headers);

        tracing::info!("validating records");
        let report = self.validator.validate(&set.records, &mapping);

        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }

        if !report.valid {
            return Err(FaultEtlError::ValidationError {
                message: format!("数据验证失败，{} 个错误", report.error_count()),
                details: report.errors.clone(),
            });
        }

        tracing::info!("transforming records");
        let result = self.transformer.transform(&set.records, &mapping);

        Ok(EtlOutcome {
            mapping,
            report,
            result,
            deleted: self.transformer.deleted_rows().clone(),
        })
    }
}
