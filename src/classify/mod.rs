//! 内容分类模块
//!
//! # 设计思路
//!
//! 剪贴板上常常同时存在多种格式（文件管理器复制文件时附带文本回退、
//! 浏览器复制时文本与图片并存）。分类器对一次性读出的快照做纯变换：
//! 按固定优先级 **文件列表 > 图片 > 纯文本 > 富文本** 选出唯一格式，
//! 并派生预览、标题与大小。无法归入任何格式的快照返回 `None`，
//! 由监控器直接丢弃，不进入历史。
//!
//! # 实现思路
//!
//! - 纯函数、无副作用：分类器不触碰剪贴板，也不触碰历史。
//! - 文本预览把所有空白段（含换行 / 制表符）折叠为单空格，截断到
//!   100 字符；标题在预览基础上进一步截断到 50 字符。
//! - 补充规则：图片与疑似代码文本并存时改选文本（浏览器复制代码的
//!   预览图是噪声），由 `skip_code_preview_images` 开关控制。

pub mod code_detection;

use crate::item::ClipPayload;
use crate::port::ImageData;

/// 文本类预览的最大可见字符数
const PREVIEW_MAX_CHARS: usize = 100;
/// 标题的最大可见字符数
const TITLE_MAX_CHARS: usize = 50;
const ELLIPSIS: &str = "...";

/// 一次剪贴板读取的完整快照
///
/// 由监控器在持有读访问时填充，各字段对应一种系统格式的内容。
#[derive(Debug, Default)]
pub struct ClipboardSnapshot {
    pub text: Option<String>,
    pub rich_text: Option<String>,
    pub image: Option<ImageData>,
    pub files: Option<Vec<String>>,
}

/// 分类结果：选定的载荷与派生的展示字段
#[derive(Debug)]
pub struct Classified {
    pub payload: ClipPayload,
    pub preview: String,
    pub title: String,
    pub size_bytes: u64,
}

/// 对快照做格式选择与展示字段派生
///
/// 返回 `None` 表示"不捕获"：快照为空、文本全是空白等。
/// `skip_code_preview_images` 为 true 时，图片与疑似代码文本并存改选文本。
pub fn classify(
    snapshot: ClipboardSnapshot,
    source_app: &str,
    skip_code_preview_images: bool,
) -> Option<Classified> {
    let ClipboardSnapshot {
        text,
        rich_text,
        image,
        files,
    } = snapshot;

    if let Some(files) = files.filter(|f| !f.is_empty()) {
        return Some(classify_file_list(files));
    }

    let text = text.filter(|t| !t.trim().is_empty());

    if let Some(image) = image.filter(|img| !img.bytes.is_empty()) {
        let code_text = text
            .as_deref()
            .filter(|t| skip_code_preview_images && code_detection::is_likely_code(t));
        if code_text.is_none() {
            return Some(classify_image(image, source_app));
        }
        log::debug!("🚫 图片伴随疑似代码文本，改为捕获文本");
    }

    if let Some(text) = text {
        return Some(classify_text(text, false));
    }

    if let Some(rich) = rich_text.filter(|t| !t.trim().is_empty()) {
        return Some(classify_text(rich, true));
    }

    None
}

fn classify_text(text: String, rich: bool) -> Classified {
    let collapsed = collapse_whitespace(&text);
    let preview = truncate_chars(&collapsed, PREVIEW_MAX_CHARS);
    let title = truncate_chars(&collapsed, TITLE_MAX_CHARS);
    let size_bytes = text.len() as u64;
    let payload = if rich {
        ClipPayload::RichText(text)
    } else {
        ClipPayload::Text(text)
    };
    Classified {
        payload,
        preview,
        title,
        size_bytes,
    }
}

fn classify_image(image: ImageData, source_app: &str) -> Classified {
    let size_bytes = image.bytes.len() as u64;
    Classified {
        title: format!("Image ({})", human_size(size_bytes)),
        preview: format!("Image from {}", source_app),
        payload: ClipPayload::Image {
            width: image.width,
            height: image.height,
            bytes: image.bytes,
        },
        size_bytes,
    }
}

fn classify_file_list(files: Vec<String>) -> Classified {
    let count = files.len();
    let preview = if count > 1 {
        format!("{} (+{} more)", files[0], count - 1)
    } else {
        files[0].clone()
    };
    Classified {
        title: format!("{} file(s)", count),
        preview,
        payload: ClipPayload::FileList(files),
        // 文件内容不被复制，大小记 0
        size_bytes: 0,
    }
}

/// 把所有空白段（含换行 / 制表符）折叠为单空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按字符数截断，超长时以省略号收尾（结果总长不超过 `max_chars`）
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.chars().count());
    let truncated: String = text.chars().take(keep).collect();
    format!("{}{}", truncated, ELLIPSIS)
}

/// 人类可读的字节大小（B / KB / MB / GB）
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= GB {
        format!("{:.1} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} B", bytes)
    }
}
