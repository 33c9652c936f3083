//! 系统剪贴板协作者接口
//!
//! # 设计思路
//!
//! 系统剪贴板是全局单例资源。引擎不直接依赖任何平台 API，而是通过
//! 本模块的 `ClipboardPort` trait 与之交互：真实后端由 `system` 子模块
//! 提供，测试注入假实现即可覆盖全部捕获路径。
//!
//! 读 / 写访问以 guard 对象建模，严格遵循"获取—使用—释放"序列：
//! guard 在离开作用域时释放访问，任何退出路径（含错误路径）都不会
//! 悬挂系统资源，也不存在嵌套获取。
//!
//! # 实现思路
//!
//! - guard 以 `Box<dyn ...>` 返回并自持资源，不借用 port，调用方可在
//!   持有 guard 期间继续查询 port 的其他只读信息。
//! - 变化通知通过 `subscribe` 注册回调送达；回调可能来自后端线程，
//!   由引擎内部经通道转回宿主事件循环线程串行处理。

pub mod system;

use crate::error::EngineError;

/// 系统剪贴板上可用的格式标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    Text,
    RichText,
    Image,
    FileList,
}

/// 原始位图数据（RGBA 字节 + 尺寸）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

/// 读访问 guard：持有期间可枚举格式并读取内容，Drop 即释放
pub trait ReadGuard {
    /// 当前剪贴板上可用的格式集合
    fn available_formats(&mut self) -> Vec<FormatTag>;
    fn read_text(&mut self) -> Result<String, EngineError>;
    fn read_rich_text(&mut self) -> Result<String, EngineError>;
    fn read_image(&mut self) -> Result<ImageData, EngineError>;
    fn read_file_list(&mut self) -> Result<Vec<String>, EngineError>;
}

/// 写访问 guard：Drop 即释放
pub trait WriteGuard {
    fn write_text(&mut self, text: &str) -> Result<(), EngineError>;
    fn write_image(&mut self, image: &ImageData) -> Result<(), EngineError>;
}

/// 系统剪贴板协作者
///
/// 引擎对平台剪贴板的全部依赖都收敛在此 trait 上。
pub trait ClipboardPort {
    /// 注册变化通知回调；重复调用替换旧回调
    fn subscribe(&mut self, on_change: Box<dyn FnMut() + Send>) -> Result<(), EngineError>;

    /// 注销变化通知回调（未注册时为空操作）
    fn unsubscribe(&mut self);

    /// 打开读访问；系统剪贴板被占用时返回 `Err`
    fn open_read(&mut self) -> Result<Box<dyn ReadGuard>, EngineError>;

    /// 打开写访问
    fn open_write(&mut self) -> Result<Box<dyn WriteGuard>, EngineError>;

    /// 前台应用标签（尽力而为，无法确定时返回空串）
    fn foreground_app_label(&self) -> String;
}
