//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `EngineError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 捕获流水线内部的失败（剪贴板被占用、格式不可读等）**不会**以 `Err`
//! 形式传出引擎边界：按设计降级为"本次变化不捕获 + 日志"，监控循环不中断。
//! `EngineError` 只出现在用户主动发起的操作（按 id 复制、导入导出等）上。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` / `serde_json::Error` 提供 `From` 转换，无需手动 map。

/// 引擎级统一错误类型
///
/// 所有对外公开的可失败操作均返回此类型。
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 剪贴板读写操作失败（系统资源被占用、后端不可用等）
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 配置校验失败，原配置保持生效
    #[error("配置无效: {0}")]
    Config(String),

    /// 按 id 查找历史条目失败
    #[error("历史条目不存在: id={0}")]
    NotFound(u64),

    /// 导入/导出数据序列化失败
    #[error("序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}
