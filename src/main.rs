//! # 剪贴板历史引擎 — 宿主入口
//!
//! 一个最小宿主：接上真实系统后端，驱动引擎事件循环，并把捕获到的
//! 条目打到日志。业务逻辑全部在库内，详见 `lib.rs` 架构文档。
//!
//! 用法：`clipboard-engine [config.json]`，配置文件缺省时使用默认配置。

use std::fs;
use std::time::Duration;

use clipboard_engine::port::system::SystemClipboard;
use clipboard_engine::{ClipboardEngine, EngineError, EngineEvent, MonitorConfig};

/// 从 JSON 文件加载配置；读取失败映射为 IO 错误，解析失败映射为序列化错误
fn load_config(path: &str) -> Result<MonitorConfig, EngineError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => {
                log::info!("⚙️ 已加载配置文件: {}", path);
                config
            }
            Err(err) => {
                log::warn!("⚙️ 加载配置文件失败，使用默认配置: {}", err);
                MonitorConfig::default()
            }
        },
        None => MonitorConfig::default(),
    };
    let mut engine = ClipboardEngine::new(Box::new(SystemClipboard::new()));
    if !engine.initialize(config) {
        log::error!("⚙️ 配置无效，退出");
        std::process::exit(1);
    }

    loop {
        engine.pump_wait(Duration::from_millis(200));
        for event in engine.take_events() {
            match event {
                EngineEvent::ItemAdded(item) => {
                    log::info!("📋 新条目 [{:?}] {}", item.format, item.preview)
                }
                EngineEvent::ItemDeleted(id) => log::info!("🗑️ 条目已删除 id={}", id),
                EngineEvent::HistoryCleared => log::info!("🧹 历史已清空"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::load_config;
    use clipboard_engine::EngineError;

    #[test]
    fn missing_config_file_surfaces_io_error() {
        let err = load_config("definitely/not/here.json").expect_err("read should fail");
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn malformed_config_file_surfaces_parse_error() {
        let path = std::env::temp_dir().join("clipboard-engine-bad-config.json");
        std::fs::write(&path, "not json").expect("write config");
        let err = load_config(path.to_str().expect("utf8 path")).expect_err("parse should fail");
        assert!(matches!(err, EngineError::Serde(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn config_file_is_loaded_and_parsed() {
        let path = std::env::temp_dir().join("clipboard-engine-config.json");
        std::fs::write(&path, r#"{"maxHistorySize": 7}"#).expect("write config");
        let config = load_config(path.to_str().expect("utf8 path")).expect("load config");
        assert_eq!(config.max_history_size, 7);
        let _ = std::fs::remove_file(&path);
    }
}
