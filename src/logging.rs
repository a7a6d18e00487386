// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 导入引擎的事件目标为 sheet_binder；依赖库默认只输出 warn 及以上
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 本库的日志目标
pub const LOG_TARGET: &str = "sheet_binder";

/// 默认过滤规则：依赖库 warn，导入引擎按指定级别
pub fn default_directive(level: &str) -> String {
    format!("warn,{}={}", LOG_TARGET, level)
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: warn,sheet_binder=info）
///   例如: RUST_LOG=sheet_binder=debug
///
/// # 返回
/// - true: 已安装
/// - false: 宿主程序已安装全局 subscriber，保持不变
///
/// # 示例
/// ```no_run
/// use sheet_binder::logging;
/// logging::init();
/// ```
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive("info")));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .is_ok()
}

/// 初始化测试环境的日志系统
///
/// 重复调用安全；输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(default_directive("debug")))
        .with_test_writer()
        .try_init();
}
