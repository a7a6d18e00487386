// ==========================================
// Excel 导入引擎 - 导入模板声明
// ==========================================
// 职责: 记录类型级配置（行校验）+ 有序字段列表 + 校验器工厂表
// 说明: 模板一次构建、多次复用；运行期不做反射
// ==========================================

use crate::schema::field::FieldDescriptor;
use crate::schema::validator::{RowCheck, ValidationOutcome, ValidatorFactory, ValidatorProvider};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ==========================================
// ClassBinding - 记录类型级配置
// ==========================================
pub struct ClassBinding<T> {
    label: String,
    validator_identity: Option<String>,
    function: Option<String>,
    inline: Option<RowCheck<T>>,
}

impl<T> ClassBinding<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            validator_identity: None,
            function: None,
            inline: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn validator_identity(&self) -> Option<&str> {
        self.validator_identity.as_deref()
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn inline_check(&self) -> Option<&RowCheck<T>> {
        self.inline.as_ref()
    }

    /// 是否配置了行校验
    pub fn has_row_check(&self) -> bool {
        self.inline.is_some() || self.function.as_deref().is_some_and(|f| !f.trim().is_empty())
    }
}

impl<T> fmt::Debug for ClassBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBinding")
            .field("label", &self.label)
            .field("validator_identity", &self.validator_identity)
            .field("function", &self.function)
            .field("inline", &self.inline.is_some())
            .finish()
    }
}

// ==========================================
// ImportSchema - 导入模板
// ==========================================
pub struct ImportSchema<T> {
    class: ClassBinding<T>,
    fields: Vec<FieldDescriptor<T>>,
    factories: HashMap<String, ValidatorFactory<T>>,
    record_factory: Option<ValidatorFactory<T>>,
}

impl<T: 'static> ImportSchema<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            class: ClassBinding::new(label),
            fields: Vec::new(),
            factories: HashMap::new(),
            record_factory: None,
        }
    }

    /// 追加字段（顺序即声明顺序）
    pub fn field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// 注册具名校验器工厂
    pub fn register_validator<F>(mut self, identity: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn ValidatorProvider<T>>> + Send + Sync + 'static,
    {
        self.factories.insert(identity.into(), Arc::new(factory));
        self
    }

    /// 注册默认构造的校验器类型
    pub fn register_default_validator<V>(self, identity: impl Into<String>) -> Self
    where
        V: ValidatorProvider<T> + Default + 'static,
    {
        self.register_validator(identity, || {
            let validator: Arc<dyn ValidatorProvider<T>> = Arc::new(V::default());
            Ok(validator)
        })
    }

    /// 记录类型本身提供校验函数（优先级最低的校验器来源）
    pub fn self_validating(mut self) -> Self
    where
        T: ValidatorProvider<T> + Default,
    {
        let factory: ValidatorFactory<T> =
            Arc::new(|| -> anyhow::Result<Arc<dyn ValidatorProvider<T>>> {
                let validator: Arc<dyn ValidatorProvider<T>> = Arc::new(T::default());
                Ok(validator)
            });
        self.record_factory = Some(factory);
        self
    }

    /// 类级校验器标识（字段未指定校验器时使用）
    pub fn class_validator(mut self, identity: impl Into<String>) -> Self {
        self.class.validator_identity = Some(identity.into());
        self
    }

    /// 具名行校验函数
    pub fn row_function(mut self, name: impl Into<String>) -> Self {
        self.class.function = Some(name.into());
        self
    }

    /// 直接提供行校验函数
    pub fn validate_row_with<F>(mut self, check: F) -> Self
    where
        F: Fn(&T, &str) -> ValidationOutcome + Send + Sync + 'static,
    {
        self.class.inline = Some(Arc::new(check));
        self
    }
}

impl<T> ImportSchema<T> {
    pub fn class(&self) -> &ClassBinding<T> {
        &self.class
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn factory(&self, identity: &str) -> Option<&ValidatorFactory<T>> {
        self.factories.get(identity)
    }

    pub fn record_factory(&self) -> Option<&ValidatorFactory<T>> {
        self.record_factory.as_ref()
    }
}

impl<T> fmt::Debug for ImportSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identities: Vec<&String> = self.factories.keys().collect();
        identities.sort();
        f.debug_struct("ImportSchema")
            .field("class", &self.class)
            .field("fields", &self.fields)
            .field("validators", &identities)
            .field("self_validating", &self.record_factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Person {
        no: Option<String>,
    }

    impl ValidatorProvider<Person> for Person {}

    #[test]
    fn test_schema_builder() {
        let schema = ImportSchema::new("人员信息表")
            .field(FieldDescriptor::text("编号", |r: &mut Person, v| r.no = v).key())
            .register_default_validator::<Person>("person")
            .class_validator("person")
            .row_function("validate")
            .self_validating();

        assert_eq!(schema.class().label(), "人员信息表");
        assert_eq!(schema.class().validator_identity(), Some("person"));
        assert!(schema.class().has_row_check());
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.factory("person").is_some());
        assert!(schema.factory("missing").is_none());
        assert!(schema.record_factory().is_some());
    }

    #[test]
    fn test_blank_row_function_is_not_a_row_check() {
        let schema: ImportSchema<Person> = ImportSchema::new("表").row_function("  ");
        assert!(!schema.class().has_row_check());

        let schema: ImportSchema<Person> =
            ImportSchema::new("表").validate_row_with(|_, _| ValidationOutcome::accepted(""));
        assert!(schema.class().has_row_check());
    }
}
