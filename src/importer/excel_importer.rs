// ==========================================
// Excel 导入引擎 - 导入入口
// ==========================================
// 职责: 读取工作簿首个工作表 → 表头绑定 → 合并单元格 → 逐行组装 → 汇总
// 策略: 模板错误立即中止；校验错误全表扫描后一次性返回，不返回任何记录
// 说明: 绑定表/锚点表/校验器缓存均为单次调用私有，导入器可跨线程复用
// ==========================================

use crate::config::ImportOptions;
use crate::importer::diagnostics::Diagnostic;
use crate::importer::error::{ImportError, TemplateError, ValidationFailure};
use crate::importer::header_resolver::{read_header_labels, resolve_bindings};
use crate::importer::merge_resolver::MergeAnchors;
use crate::importer::row_assembler::RowAssembler;
use crate::importer::validator_registry::ValidatorRegistry;
use crate::schema::ImportSchema;
use crate::workbook::{load_first_sheet, SheetSource};
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

// ==========================================
// ImportBatch - 导入结果
// ==========================================
#[derive(Debug)]
pub struct ImportBatch<T> {
    batch_id: String,
    sheet_name: String,
    rows_scanned: usize,
    records: Vec<T>,
    diagnostics: Vec<Diagnostic>,
    elapsed: Duration,
}

impl<T> ImportBatch<T> {
    fn empty(batch_id: String, sheet_name: impl Into<String>) -> Self {
        Self {
            batch_id,
            sheet_name: sheet_name.into(),
            rows_scanned: 0,
            records: Vec::new(),
            diagnostics: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// 扫描的数据行数（含被排除的行）
    pub fn rows_scanned(&self) -> usize {
        self.rows_scanned
    }

    /// 按行顺序排列的记录
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 导入过程中的可恢复故障（被排除的行、不可用的校验器等）
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

// ==========================================
// ExcelImporter - 导入器
// ==========================================
pub struct ExcelImporter<T> {
    schema: ImportSchema<T>,
    options: ImportOptions,
}

impl<T: Default> ExcelImporter<T> {
    pub fn new(schema: ImportSchema<T>) -> Self {
        Self {
            schema,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &ImportSchema<T> {
        &self.schema
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// 从文件导入（.xlsx, .xls）
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportBatch<T>, ImportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "读取文件失败");
            TemplateError::UnreadableWorkbook(format!("{}: {}", path.display(), e))
        })?;
        self.import_bytes(&bytes)
    }

    /// 从输入流导入（先完整读入内存）
    pub fn import_reader<R: Read>(&self, mut reader: R) -> Result<ImportBatch<T>, ImportError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|e| {
            error!(error = %e, "读取输入流失败");
            TemplateError::UnreadableWorkbook(e.to_string())
        })?;
        self.import_bytes(&bytes)
    }

    /// 从内存中的工作簿导入（只读取第一个工作表）
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportBatch<T>, ImportError> {
        debug!(size = bytes.len(), "解析工作簿");
        match load_first_sheet(bytes)? {
            Some(sheet) => self.import_sheet(&sheet),
            None => {
                warn!("工作簿中没有工作表");
                Ok(ImportBatch::empty(Uuid::new_v4().to_string(), ""))
            }
        }
    }

    /// 从已加载的工作表导入
    ///
    /// # 返回
    /// - Ok(ImportBatch): 全部数据行校验通过
    /// - Err(ImportError::Template): 结构错误（缺列、不支持的字段类型等）
    /// - Err(ImportError::Validation): 全表汇总的校验信息
    #[instrument(skip_all, fields(batch_id, sheet = %sheet.name()))]
    pub fn import_sheet<S: SheetSource>(&self, sheet: &S) -> Result<ImportBatch<T>, ImportError> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        Span::current().record("batch_id", batch_id.as_str());

        self.options.validate()?;
        info!(batch_id = %batch_id, schema = %self.schema.class().label(), "开始导入");

        let last_row = match sheet.last_row_index() {
            Some(last) if last > 0 => last,
            _ => {
                info!("工作表没有数据行");
                return Ok(ImportBatch::empty(batch_id, sheet.name()));
            }
        };

        // === 步骤 1: 表头绑定（结构校验，缺列立即中止） ===
        let header_row = self.options.header_row_index();
        let labels = read_header_labels(sheet, header_row, &self.options.default_date_format);
        let bindings = resolve_bindings(&labels, self.schema.fields(), &self.options.default_date_format)?;
        debug!(header_row = header_row + 1, bound = bindings.len(), "表头绑定完成");

        // === 步骤 2: 合并单元格锚点 ===
        let anchors = MergeAnchors::from_regions(sheet.merged_regions());
        debug!(merged = sheet.merged_regions().len(), "合并单元格解析完成");

        // === 步骤 3: 逐行组装 ===
        let registry = ValidatorRegistry::new(&self.schema);
        let outcome = RowAssembler::new(&bindings, &anchors, self.schema.class(), registry, &self.options)
            .scan(sheet, self.options.first_data_row(), last_row)?;

        // === 步骤 4: 汇总 ===
        let elapsed = start_time.elapsed();
        if !outcome.messages.is_empty() {
            warn!(
                batch_id = %batch_id,
                rows = outcome.rows_scanned,
                violations = outcome.messages.len(),
                elapsed_ms = elapsed.as_millis(),
                "数据校验未通过"
            );
            return Err(ValidationFailure::new(
                outcome.messages,
                outcome.diagnostics,
                self.options.line_separator.as_str(),
            )
            .into());
        }

        info!(
            batch_id = %batch_id,
            rows = outcome.rows_scanned,
            records = outcome.records.len(),
            diagnostics = outcome.diagnostics.len(),
            elapsed_ms = elapsed.as_millis(),
            "导入完成"
        );

        Ok(ImportBatch {
            batch_id,
            sheet_name: sheet.name().to_string(),
            rows_scanned: outcome.rows_scanned,
            records: outcome.records,
            diagnostics: outcome.diagnostics,
            elapsed,
        })
    }
}
