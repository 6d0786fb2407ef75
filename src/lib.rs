//! # Cxml Pipeline Library / Cxml 流水线库
//!
//! Build, dependency and test orchestration for the Cxml C++ application.
//! The binary is a thin wrapper around [`cli::run`].
//!
//! Cxml C++ 应用程序的构建、依赖和测试编排。
//!
//! ## Modules / 模块
//!
//! - `core` - Build state machine, dependency installers, test phases and their models
//! - `infra` - Command execution, host detection, file system helpers and logging
//! - `reporting` - Console summaries
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 构建状态机、依赖安装器、测试阶段及其模型
//! - `infra` - 命令执行、宿主机检测、文件系统辅助和日志
//! - `reporting` - 控制台摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use self::core::config;
pub use self::core::models;

/// Maps a requested locale onto one the application ships.
///
/// Tries the full tag (`zh-CN`), then its language part (`en-US` -> `en`),
/// then falls back to `en`.
///
/// 将请求的语言映射到已提供的语言：先完整匹配，再匹配语言部分，最后回退到 `en`。
pub fn resolve_locale(requested: &str) -> String {
    let available = rust_i18n::available_locales!();
    if available.contains(&requested) {
        return requested.to_string();
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|code| available.contains(code))
        .unwrap_or("en")
        .to_string()
}

/// Switches the interface language, see [`resolve_locale`].
pub fn set_language(requested: &str) {
    rust_i18n::set_locale(&resolve_locale(requested));
}

/// Picks the interface language from the system locale.
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
