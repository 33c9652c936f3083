//! 只读查询视图模块
//!
//! # 设计思路
//!
//! 在历史存储之上派生过滤 / 筛选后的只读视图：搜索词 + 格式过滤，
//! 两个条件取交集。每次调用现算，不缓存派生状态，从根上避免与
//! 历史存储失去同步的问题。视图永远沿存储当前的 MRU 顺序输出，
//! 绝不重排。
//!
//! # 实现思路
//!
//! - 文本匹配不区分大小写，作用于标题、预览，以及（仅文本 / 富文本
//!   格式）完整载荷。
//! - `format_filter` 用 `Option<ClipFormat>` 表达，`None` 即"全部匹配"。

use crate::history::HistoryStore;
use crate::item::{ClipFormat, ClipPayload, ClipboardItem};

/// 过滤后的只读视图，沿存储的 MRU 顺序输出
pub fn query<'a>(
    store: &'a HistoryStore,
    search_term: &str,
    format_filter: Option<ClipFormat>,
) -> Vec<&'a ClipboardItem> {
    let term = search_term.to_lowercase();
    store
        .iter()
        .filter(|item| format_filter.is_none_or(|f| item.format == f))
        .filter(|item| term.is_empty() || matches_term(item, &term))
        .collect()
}

/// 收藏条目的只读视图（MRU 顺序）
pub fn favorites(store: &HistoryStore) -> Vec<&ClipboardItem> {
    store.iter().filter(|item| item.is_favorite).collect()
}

/// `term` 须已转为小写
fn matches_term(item: &ClipboardItem, term: &str) -> bool {
    if item.title.to_lowercase().contains(term) || item.preview.to_lowercase().contains(term) {
        return true;
    }
    match &item.payload {
        ClipPayload::Text(text) | ClipPayload::RichText(text) => {
            text.to_lowercase().contains(term)
        }
        _ => false,
    }
}
