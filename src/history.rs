//! 历史存储模块
//!
//! # 设计思路
//!
//! `HistoryStore` 是条目的唯一属主：一个按 id 索引的 arena（`HashMap`）
//! 加一条 MRU 顺序链（`VecDeque<u64>`），两者在任何时刻保持同步——
//! 顺序链里的每个 id 都在 arena 中，反之亦然。新捕获（或重复再捕获的
//! 提升）永远落在索引 0。
//!
//! 驱逐策略：条数超出上限时从尾部（最久未用端）扫描第一个既未置顶
//! 也未收藏的条目并移除；若全部受保护则停止——**保护标志是硬保证，
//! 条数上限只是软目标**，允许历史暂时超限。
//!
//! # 实现思路
//!
//! - 引擎单线程驱动，无锁。
//! - `remove` 无条件移除（唯一能动到受保护条目的路径，只由用户显式
//!   删除触发）；自动路径（`enforce_limit` / `clear_unprotected`）
//!   永远绕开受保护条目。

use std::collections::{HashMap, VecDeque};

use crate::item::ClipboardItem;

/// 有界、保护感知的历史存储
#[derive(Debug)]
pub struct HistoryStore {
    items: HashMap<u64, ClipboardItem>,
    /// MRU 顺序：队首是最新条目
    order: VecDeque<u64>,
    max_history_size: usize,
}

impl HistoryStore {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            items: HashMap::new(),
            order: VecDeque::new(),
            max_history_size,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&ClipboardItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut ClipboardItem> {
        self.items.get_mut(&id)
    }

    /// MRU 顺序的条目视图（队首最新）
    pub fn all(&self) -> Vec<&ClipboardItem> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// MRU 顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &ClipboardItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// 头插新条目并立刻执行驱逐
    pub fn insert(&mut self, item: ClipboardItem) {
        let id = item.id;
        self.items.insert(id, item);
        self.order.push_front(id);
        self.enforce_limit();
    }

    /// 把既有条目移到索引 0，其余条目相对顺序不变
    pub fn promote(&mut self, id: u64) -> bool {
        let Some(pos) = self.order.iter().position(|&x| x == id) else {
            return false;
        };
        self.order.remove(pos);
        self.order.push_front(id);
        true
    }

    /// 原地更新捕获时间（重复条目再捕获）
    pub fn touch(&mut self, id: u64, now_millis: i64) -> bool {
        match self.items.get_mut(&id) {
            Some(item) => {
                item.captured_at = now_millis;
                true
            }
            None => false,
        }
    }

    /// 无条件移除，无视保护标志——只应由用户显式删除调用
    pub fn remove(&mut self, id: u64) -> Option<ClipboardItem> {
        let item = self.items.remove(&id)?;
        if let Some(pos) = self.order.iter().position(|&x| x == id) {
            self.order.remove(pos);
        }
        Some(item)
    }

    /// 一趟清除所有不受保护的条目，返回移除数量
    pub fn clear_unprotected(&mut self) -> usize {
        let before = self.order.len();
        let items = &self.items;
        self.order
            .retain(|id| items.get(id).is_some_and(|item| item.is_protected()));
        let keep: std::collections::HashSet<u64> = self.order.iter().copied().collect();
        self.items.retain(|id, _| keep.contains(id));
        before - self.order.len()
    }

    /// 清空全部条目（子系统关停时的整体拆除）
    pub fn clear_all(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// 更新条数上限并立即按新上限执行驱逐
    pub fn set_limit(&mut self, max_history_size: usize) {
        self.max_history_size = max_history_size;
        self.enforce_limit();
    }

    /// 驱逐循环：超限时从尾部找第一个不受保护的条目移除；
    /// 最新条目（索引 0）不参与尾扫——刚捕获的内容不能被自己的插入
    /// 挤出去。候选只剩受保护条目时放弃本轮驱逐，允许超限。
    fn enforce_limit(&mut self) {
        while self.order.len() > self.max_history_size {
            let victim = self
                .order
                .iter()
                .rev()
                .take(self.order.len().saturating_sub(1))
                .find(|id| {
                    self.items
                        .get(id)
                        .is_some_and(|item| !item.is_protected())
                })
                .copied();

            match victim {
                Some(id) => {
                    self.items.remove(&id);
                    if let Some(pos) = self.order.iter().position(|&x| x == id) {
                        self.order.remove(pos);
                    }
                    log::debug!("🧹 历史超限，驱逐条目 id={}", id);
                }
                None => {
                    log::debug!(
                        "🧹 历史超限（{} > {}）但全部条目受保护，放弃驱逐",
                        self.order.len(),
                        self.max_history_size
                    );
                    break;
                }
            }
        }
    }
}
