//! 历史条目数据模型
//!
//! # 设计思路
//!
//! `ClipboardItem` 是引擎内唯一的条目载体：格式、载荷、预览、来源应用、
//! 时间戳与两个驱逐保护标志（置顶 / 收藏）。载荷按格式携带不同数据，
//! 通过枚举一次性建模，避免"格式字段与载荷字段不一致"这类状态。
//!
//! # 实现思路
//!
//! - `format` 冗余保存一份（由载荷推导），序列化后前端无需解包枚举即可筛选。
//! - `content_hash` 在创建时计算一次，供去重索引做快速预判（见 `dedup`）。
//! - id 由 `IdAllocator` 会话内单调分配；引擎单线程驱动，无需原子量。
//! - 时间戳沿用 `chrono::Utc::now().timestamp_millis()` 的毫秒整数表示。

use serde::{Deserialize, Serialize};

/// 条目格式标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipFormat {
    Text,
    RichText,
    Image,
    FileList,
}

/// 格式相关的条目载荷
///
/// - 文本 / 富文本：UTF-8 字符串
/// - 图片：原始位图字节（RGBA），宽高随载荷保存以便写回剪贴板
/// - 文件列表：绝对路径的有序列表（不复制文件内容）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipPayload {
    Text(String),
    RichText(String),
    Image {
        width: usize,
        height: usize,
        bytes: Vec<u8>,
    },
    FileList(Vec<String>),
}

impl ClipPayload {
    /// 载荷对应的格式标签
    pub fn format(&self) -> ClipFormat {
        match self {
            ClipPayload::Text(_) => ClipFormat::Text,
            ClipPayload::RichText(_) => ClipFormat::RichText,
            ClipPayload::Image { .. } => ClipFormat::Image,
            ClipPayload::FileList(_) => ClipFormat::FileList,
        }
    }

    /// 载荷占用字节数（文件列表为 0，文件内容不被复制）
    pub fn size_bytes(&self) -> u64 {
        match self {
            ClipPayload::Text(s) | ClipPayload::RichText(s) => s.len() as u64,
            ClipPayload::Image { bytes, .. } => bytes.len() as u64,
            ClipPayload::FileList(_) => 0,
        }
    }
}

/// 剪贴板历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: u64,
    pub format: ClipFormat,
    pub payload: ClipPayload,
    /// 短预览（文本类 ≤100 字符，图片/文件为合成描述）
    pub preview: String,
    /// 紧凑标题（≤50 字符，超长截断加省略号）
    pub title: String,
    pub size_bytes: u64,
    /// 捕获时前台应用标签，无法确定时为空串
    pub source_app: String,
    /// 捕获时间（毫秒时间戳）；重复条目再次捕获时原地更新
    pub captured_at: i64,
    pub is_pinned: bool,
    pub is_favorite: bool,
    /// 去重快速预判用的内容哈希，创建时计算一次
    #[serde(default)]
    pub content_hash: u64,
}

impl ClipboardItem {
    /// 条目是否受驱逐保护（置顶或收藏任一即受保护）
    pub fn is_protected(&self) -> bool {
        self.is_pinned || self.is_favorite
    }
}

/// 会话内单调 id 分配器
///
/// 引擎状态由宿主事件循环单线程驱动，普通计数器即可保证会话内不碰撞。
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// 当前毫秒时间戳
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
