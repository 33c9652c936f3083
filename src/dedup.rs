//! 去重索引模块
//!
//! # 设计思路
//!
//! 判定两个条目互为重复的条件：格式相同 **且** 载荷逐字节（文本逐字符、
//! 文件列表逐路径）相等。图片与文件列表比较完整内容，不只比大小。
//!
//! 本模块只做查找，不碰历史存储；命中后的"更新时间 + 提升到索引 0"
//! 由监控器执行。
//!
//! # 实现思路
//!
//! - 每个条目创建时缓存一个 64 位内容哈希（`content_hash`），查找时
//!   先比 `(格式, 哈希)` 快速排除，哈希命中后再做完整载荷相等性确认，
//!   哈希碰撞不会产生误判重复。
//! - 扫描沿 MRU 顺序 O(n) 进行；历史上限通常在几百条内，足够快。

use std::hash::{Hash, Hasher};

use crate::history::HistoryStore;
use crate::item::ClipPayload;

/// 计算载荷的 64 位内容哈希（含格式判别，创建条目时调用一次）
pub fn content_hash(payload: &ClipPayload) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    match payload {
        ClipPayload::Text(s) => {
            0u8.hash(&mut hasher);
            s.hash(&mut hasher);
        }
        ClipPayload::RichText(s) => {
            1u8.hash(&mut hasher);
            s.hash(&mut hasher);
        }
        ClipPayload::Image {
            width,
            height,
            bytes,
        } => {
            2u8.hash(&mut hasher);
            width.hash(&mut hasher);
            height.hash(&mut hasher);
            bytes.hash(&mut hasher);
        }
        ClipPayload::FileList(paths) => {
            3u8.hash(&mut hasher);
            paths.hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// 在历史中查找与候选载荷内容相同的条目，返回其 id
///
/// 快速路径比 `(格式, 哈希)`，命中后以完整载荷相等性确认。
pub fn find_duplicate(store: &HistoryStore, candidate: &ClipPayload, hash: u64) -> Option<u64> {
    let format = candidate.format();
    store
        .iter()
        .find(|item| {
            item.format == format && item.content_hash == hash && item.payload == *candidate
        })
        .map(|item| item.id)
}

#[cfg(test)]
mod tests {
    use super::{content_hash, find_duplicate};
    use crate::history::HistoryStore;
    use crate::item::{ClipPayload, ClipboardItem};

    fn insert_payload(store: &mut HistoryStore, id: u64, payload: ClipPayload) {
        let hash = content_hash(&payload);
        store.insert(ClipboardItem {
            id,
            format: payload.format(),
            payload,
            preview: String::new(),
            title: String::new(),
            size_bytes: 0,
            source_app: String::new(),
            captured_at: 0,
            is_pinned: false,
            is_favorite: false,
            content_hash: hash,
        });
    }

    #[test]
    fn identical_text_is_duplicate() {
        let mut store = HistoryStore::new(10);
        insert_payload(&mut store, 1, ClipPayload::Text("hello".into()));

        let candidate = ClipPayload::Text("hello".into());
        let hash = content_hash(&candidate);
        assert_eq!(find_duplicate(&store, &candidate, hash), Some(1));
    }

    #[test]
    fn different_text_is_not_duplicate() {
        let mut store = HistoryStore::new(10);
        insert_payload(&mut store, 1, ClipPayload::Text("hello".into()));

        let candidate = ClipPayload::Text("hello!".into());
        let hash = content_hash(&candidate);
        assert_eq!(find_duplicate(&store, &candidate, hash), None);
    }

    #[test]
    fn same_text_different_format_is_not_duplicate() {
        let mut store = HistoryStore::new(10);
        insert_payload(&mut store, 1, ClipPayload::Text("hello".into()));

        let candidate = ClipPayload::RichText("hello".into());
        let hash = content_hash(&candidate);
        assert_eq!(find_duplicate(&store, &candidate, hash), None);
    }

    #[test]
    fn image_duplicate_requires_full_content_equality() {
        let mut store = HistoryStore::new(10);
        insert_payload(
            &mut store,
            1,
            ClipPayload::Image {
                width: 2,
                height: 2,
                bytes: vec![1, 2, 3, 4],
            },
        );

        // 同尺寸同大小但内容不同：不是重复
        let candidate = ClipPayload::Image {
            width: 2,
            height: 2,
            bytes: vec![1, 2, 3, 5],
        };
        let hash = content_hash(&candidate);
        assert_eq!(find_duplicate(&store, &candidate, hash), None);

        let same = ClipPayload::Image {
            width: 2,
            height: 2,
            bytes: vec![1, 2, 3, 4],
        };
        let hash = content_hash(&same);
        assert_eq!(find_duplicate(&store, &same, hash), Some(1));
    }

    #[test]
    fn file_list_order_matters() {
        let mut store = HistoryStore::new(10);
        insert_payload(
            &mut store,
            1,
            ClipPayload::FileList(vec!["a".into(), "b".into()]),
        );

        let reordered = ClipPayload::FileList(vec!["b".into(), "a".into()]);
        let hash = content_hash(&reordered);
        assert_eq!(find_duplicate(&store, &reordered, hash), None);
    }

    #[test]
    fn stale_hash_does_not_false_match() {
        // 即使条目上的缓存哈希恰好相同，完整载荷比较也会排除非重复
        let mut store = HistoryStore::new(10);
        let payload = ClipPayload::Text("aaa".into());
        let hash = content_hash(&payload);
        store.insert(ClipboardItem {
            id: 1,
            format: payload.format(),
            payload: ClipPayload::Text("bbb".into()),
            preview: String::new(),
            title: String::new(),
            size_bytes: 0,
            source_app: String::new(),
            captured_at: 0,
            is_pinned: false,
            is_favorite: false,
            content_hash: hash,
        });
        assert_eq!(find_duplicate(&store, &payload, hash), None);
    }
}
