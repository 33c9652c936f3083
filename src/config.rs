//! 监控配置模块
//!
//! # 设计思路
//!
//! `MonitorConfig` 是由宿主注入的普通值对象：监控开关、历史条数上限、
//! 单条大小上限、各格式的捕获开关、来源应用排除列表等。引擎不拥有
//! 配置来源，只负责校验与应用；校验失败时以布尔失败返回，原配置保持生效。
//!
//! # 实现思路
//!
//! - serde 派生 + `camelCase` 字段名，与宿主侧 JSON 配置文件直接对接。
//! - 每个字段带 `default`，宿主只需写出想覆盖的键。
//! - `validate()` 返回 `Result`，上限为 0 视为无效（上限是硬限制而非"无限"）。

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const DEFAULT_MAX_HISTORY_SIZE: usize = 100;
const DEFAULT_MAX_ITEM_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// 剪贴板监控配置（宿主注入的值对象）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// 初始化后是否立即开始监控
    pub enable_monitoring: bool,
    /// 历史条数上限（软目标：受保护条目可使实际条数超限）
    pub max_history_size: usize,
    /// 单条载荷大小上限（字节），超限的捕获被静默丢弃
    pub max_item_size_bytes: u64,
    /// 是否捕获图片
    pub save_images: bool,
    /// 是否捕获文件列表
    pub save_files: bool,
    /// 是否捕获富文本
    pub save_rich_text: bool,
    /// 来源应用排除列表（区分大小写的子串匹配）
    pub exclude_apps: Vec<String>,
    /// 宿主窗口隐藏时是否继续监控（由宿主裁决，引擎仅保存该值）
    pub monitor_when_hidden: bool,
    /// 图片与疑似代码文本同时在剪贴板上时，优先捕获文本
    /// （浏览器复制代码常附带预览图，见 `classify::code_detection`）
    pub skip_code_preview_images: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enable_monitoring: true,
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            max_item_size_bytes: DEFAULT_MAX_ITEM_SIZE_BYTES,
            save_images: true,
            save_files: true,
            save_rich_text: true,
            exclude_apps: Vec::new(),
            monitor_when_hidden: true,
            skip_code_preview_images: true,
        }
    }
}

impl MonitorConfig {
    /// 校验配置取值
    ///
    /// 上限为 0 的配置被拒绝：调用方（`initialize` / `set_config`）
    /// 收到 `Err` 后保持原配置生效。
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_history_size == 0 {
            return Err(EngineError::Config(
                "maxHistorySize 必须大于 0".to_string(),
            ));
        }
        if self.max_item_size_bytes == 0 {
            return Err(EngineError::Config(
                "maxItemSizeBytes 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 来源应用是否命中排除列表（区分大小写的子串匹配）
    pub fn is_app_excluded(&self, source_app: &str) -> bool {
        if source_app.is_empty() {
            return false;
        }
        self.exclude_apps
            .iter()
            .any(|pattern| !pattern.is_empty() && source_app.contains(pattern))
    }
}

// 序列化时不用 default 作为跳过条件，确保导出的配置文件是完整模板。
// 上面的 `#[serde(default)]` 只作用于反序列化。

#[cfg(test)]
mod tests {
    use super::MonitorConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_history_size_rejected() {
        let config = MonitorConfig {
            max_history_size: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_item_size_rejected() {
        let config = MonitorConfig {
            max_item_size_bytes: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"maxHistorySize": 3}"#).expect("parse partial config");
        assert_eq!(config.max_history_size, 3);
        assert!(config.save_images);
        assert!(config.exclude_apps.is_empty());
    }

    #[test]
    fn exclude_match_is_case_sensitive_substring() {
        let config = MonitorConfig {
            exclude_apps: vec!["KeePass".to_string()],
            ..MonitorConfig::default()
        };
        assert!(config.is_app_excluded("KeePass 2.57"));
        assert!(!config.is_app_excluded("keepass 2.57"));
        assert!(!config.is_app_excluded(""));
    }
}
