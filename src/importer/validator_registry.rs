// ==========================================
// Excel 导入引擎 - 校验器注册表
// ==========================================
// 职责: 按需创建并缓存校验器实例（每次导入独立一份）
// 优先级: 字段级校验器 > 类级校验器 > 记录类型自身
// 说明: 创建失败只记录诊断，该字段此后视为无可用校验器
// ==========================================

use crate::importer::diagnostics::{Diagnostic, DiagnosticKind};
use crate::schema::{FieldDescriptor, ImportSchema, ValidatorFactory, ValidatorProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RegistryKey {
    Field(String),
    Row,
}

pub struct ValidatorRegistry<'s, T> {
    schema: &'s ImportSchema<T>,
    cache: HashMap<RegistryKey, Option<Arc<dyn ValidatorProvider<T>>>>,
}

impl<'s, T> ValidatorRegistry<'s, T> {
    pub fn new(schema: &'s ImportSchema<T>) -> Self {
        Self {
            schema,
            cache: HashMap::new(),
        }
    }

    /// 字段校验器
    pub fn field_validator(
        &mut self,
        descriptor: &FieldDescriptor<T>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Arc<dyn ValidatorProvider<T>>> {
        let key = RegistryKey::Field(descriptor.label().to_string());
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let identity = descriptor
            .validator_identity()
            .or_else(|| self.schema.class().validator_identity());
        let resolved = self.instantiate(identity, descriptor.label(), diagnostics);
        self.cache.insert(key, resolved.clone());
        resolved
    }

    /// 行校验器
    pub fn row_validator(&mut self, diagnostics: &mut Vec<Diagnostic>) -> Option<Arc<dyn ValidatorProvider<T>>> {
        if let Some(cached) = self.cache.get(&RegistryKey::Row) {
            return cached.clone();
        }

        let identity = self.schema.class().validator_identity();
        let resolved = self.instantiate(identity, self.schema.class().label(), diagnostics);
        self.cache.insert(RegistryKey::Row, resolved.clone());
        resolved
    }

    fn instantiate(
        &self,
        identity: Option<&str>,
        owner: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Arc<dyn ValidatorProvider<T>>> {
        let factory: Option<&ValidatorFactory<T>> = match identity {
            Some(id) => self.schema.factory(id),
            None => self.schema.record_factory(),
        };
        let source = identity.unwrap_or("<record>");

        let Some(factory) = factory else {
            warn!(validator = %source, owner = %owner, "校验器未注册");
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::ValidatorUnavailable,
                    format!("校验器未注册: {}", source),
                )
                .for_field(owner),
            );
            return None;
        };

        match factory() {
            Ok(validator) => Some(validator),
            Err(e) => {
                warn!(validator = %source, owner = %owner, error = %e, "初始化校验器失败");
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::ValidatorUnavailable,
                        format!("初始化校验器失败 ({}): {}", source, e),
                    )
                    .for_field(owner),
                );
                None
            }
        }
    }
}
