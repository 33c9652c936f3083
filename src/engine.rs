//! 引擎门面模块
//!
//! # 设计思路
//!
//! `ClipboardEngine` 是宿主（UI 层）看到的唯一入口：配置注入、监控
//! 启停、历史查询、用户动作（复制 / 删除 / 置顶 / 收藏 / 清空）以及
//! 事件投递都收敛在这里。内部把工作委托给各组件：`MonitorController`
//! 驱动捕获，`HistoryStore` 管序与驱逐，`query` 派生只读视图。
//!
//! 事件通知采用显式队列而非回调注册：引擎把 `EngineEvent` 依序推入
//! 内部队列，宿主在自己的事件循环里 `take_events()` 拉走——每类事件
//! 至少一次、按发生顺序投递。
//!
//! # 实现思路
//!
//! - 引擎状态全部由宿主单线程驱动（`pump` / 用户动作 / 查询都在同一
//!   事件循环串行执行），无内部锁。
//! - 配置校验失败以 `false` 返回并保持原配置生效。
//! - 写回剪贴板前先武装回声抑制标志，再发起系统写入。
//! - 导入 / 导出走 serde JSON 边界，导入条目重新分配 id 并重算哈希。

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::dedup;
use crate::error::EngineError;
use crate::history::HistoryStore;
use crate::item::{ClipFormat, ClipPayload, ClipboardItem, IdAllocator};
use crate::monitor::MonitorController;
use crate::port::{ClipboardPort, ImageData};
use crate::query;

/// 引擎对宿主投递的事件（按发生顺序，至少一次）
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// 新条目进入历史（重复再捕获不触发）
    ItemAdded(ClipboardItem),
    /// 条目被用户显式删除
    ItemDeleted(u64),
    /// 一次"清空历史"完成（无论实际移除多少条，恰好一次）
    HistoryCleared,
}

/// 剪贴板历史引擎门面
pub struct ClipboardEngine {
    port: Box<dyn ClipboardPort>,
    config: MonitorConfig,
    store: HistoryStore,
    monitor: MonitorController,
    ids: IdAllocator,
    events: VecDeque<EngineEvent>,
    initialized: bool,
}

impl ClipboardEngine {
    /// 以注入的系统剪贴板协作者构造引擎（尚未初始化）
    pub fn new(port: Box<dyn ClipboardPort>) -> Self {
        let config = MonitorConfig::default();
        let store = HistoryStore::new(config.max_history_size);
        Self {
            port,
            config,
            store,
            monitor: MonitorController::new(),
            ids: IdAllocator::new(),
            events: VecDeque::new(),
            initialized: false,
        }
    }

    // ========================================================================
    // 生命周期与配置
    // ========================================================================

    /// 注入配置并初始化引擎
    ///
    /// 配置无效时返回 `false`，原配置保持生效。配置有效且
    /// `enable_monitoring` 为 true 时立即启动监控（启动失败只记日志，
    /// 宿主可稍后重试 `start_monitoring`）。
    pub fn initialize(&mut self, config: MonitorConfig) -> bool {
        if let Err(err) = config.validate() {
            log::warn!("⚙️ 初始化配置被拒绝: {}", err);
            return false;
        }
        let auto_start = config.enable_monitoring;
        self.store.set_limit(config.max_history_size);
        self.config = config;
        self.initialized = true;
        log::info!("⚙️ 引擎已初始化（历史上限 {} 条）", self.config.max_history_size);

        if auto_start {
            if let Err(err) = self.start_monitoring() {
                log::error!("📋 初始化后启动监控失败: {}", err);
            }
        }
        true
    }

    /// 替换配置；校验失败返回 `false` 并保持原配置生效
    pub fn set_config(&mut self, config: MonitorConfig) -> bool {
        if let Err(err) = config.validate() {
            log::warn!("⚙️ 新配置被拒绝，沿用原配置: {}", err);
            return false;
        }
        self.store.set_limit(config.max_history_size);
        self.config = config;
        true
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// 整体拆除：停止监控并清空全部状态
    pub fn shutdown(&mut self) {
        self.monitor.stop(self.port.as_mut());
        self.store.clear_all();
        self.events.clear();
        self.initialized = false;
        log::info!("⚙️ 引擎已关停");
    }

    // ========================================================================
    // 监控控制
    // ========================================================================

    pub fn start_monitoring(&mut self) -> Result<(), EngineError> {
        self.monitor.start(
            self.port.as_mut(),
            &mut self.store,
            &self.config,
            &mut self.ids,
            &mut self.events,
        )
    }

    pub fn stop_monitoring(&mut self) {
        self.monitor.stop(self.port.as_mut());
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    /// 排空积压的系统变化通知（非阻塞），返回处理条数
    pub fn pump(&mut self) -> usize {
        self.monitor.pump(
            self.port.as_mut(),
            &mut self.store,
            &self.config,
            &mut self.ids,
            &mut self.events,
        )
    }

    /// 阻塞最多 `timeout` 等第一条通知再排空积压，返回处理条数
    pub fn pump_wait(&mut self, timeout: Duration) -> usize {
        self.monitor.pump_wait(
            timeout,
            self.port.as_mut(),
            &mut self.store,
            &self.config,
            &mut self.ids,
            &mut self.events,
        )
    }

    // ========================================================================
    // 历史查询
    // ========================================================================

    /// 全部历史（MRU 顺序）
    pub fn history(&self) -> Vec<&ClipboardItem> {
        self.store.all()
    }

    /// 收藏视图（MRU 顺序）
    pub fn favorites(&self) -> Vec<&ClipboardItem> {
        query::favorites(&self.store)
    }

    /// 搜索词 + 格式过滤的只读视图，现算不缓存
    pub fn query(&self, term: &str, format_filter: Option<ClipFormat>) -> Vec<&ClipboardItem> {
        query::query(&self.store, term, format_filter)
    }

    pub fn get(&self, id: u64) -> Option<&ClipboardItem> {
        self.store.get(id)
    }

    // ========================================================================
    // 用户动作
    // ========================================================================

    /// 把历史条目写回系统剪贴板
    ///
    /// 写入前武装回声抑制标志，系统回照的变化通知会被吞掉恰好一次。
    /// 文件列表以换行拼接的路径文本写回（系统后端不支持写 CF_HDROP）。
    pub fn copy_to_clipboard(&mut self, id: u64) -> Result<(), EngineError> {
        let item = self.store.get(id).ok_or(EngineError::NotFound(id))?;
        let payload = item.payload.clone();

        self.monitor.arm_suppression();
        let mut guard = self.port.open_write()?;
        match &payload {
            ClipPayload::Text(text) | ClipPayload::RichText(text) => guard.write_text(text)?,
            ClipPayload::Image {
                width,
                height,
                bytes,
            } => guard.write_image(&ImageData {
                width: *width,
                height: *height,
                bytes: bytes.clone(),
            })?,
            ClipPayload::FileList(paths) => guard.write_text(&paths.join("\n"))?,
        }
        log::debug!("📋 条目 id={} 已写回剪贴板", id);
        Ok(())
    }

    /// 无条件删除（唯一能移除受保护条目的路径，始终由用户显式发起）
    pub fn delete_item(&mut self, id: u64) -> Result<(), EngineError> {
        self.store.remove(id).ok_or(EngineError::NotFound(id))?;
        self.events.push_back(EngineEvent::ItemDeleted(id));
        log::debug!("🗑️ 条目 id={} 已删除", id);
        Ok(())
    }

    /// 翻转置顶标志，返回新值
    pub fn toggle_pin(&mut self, id: u64) -> Result<bool, EngineError> {
        let item = self.store.get_mut(id).ok_or(EngineError::NotFound(id))?;
        item.is_pinned = !item.is_pinned;
        Ok(item.is_pinned)
    }

    /// 翻转收藏标志，返回新值
    pub fn toggle_favorite(&mut self, id: u64) -> Result<bool, EngineError> {
        let item = self.store.get_mut(id).ok_or(EngineError::NotFound(id))?;
        item.is_favorite = !item.is_favorite;
        Ok(item.is_favorite)
    }

    /// 手动把条目提到最前
    pub fn promote(&mut self, id: u64) -> Result<(), EngineError> {
        if !self.store.promote(id) {
            return Err(EngineError::NotFound(id));
        }
        Ok(())
    }

    /// 清空历史：受保护条目原样保留；事件恰好发出一次
    pub fn clear_history(&mut self) -> usize {
        let removed = self.store.clear_unprotected();
        self.events.push_back(EngineEvent::HistoryCleared);
        log::info!("🧹 历史已清空，移除 {} 条（受保护条目保留）", removed);
        removed
    }

    /// 拉走当前积压的全部事件（按发生顺序）
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    // ========================================================================
    // 导入 / 导出（外部持久化边界）
    // ========================================================================

    /// 把全部历史导出为 JSON（MRU 顺序）
    pub fn export_json(&self) -> Result<String, EngineError> {
        let items: Vec<&ClipboardItem> = self.store.all();
        Ok(serde_json::to_string_pretty(&items)?)
    }

    /// 从 JSON 导入条目（期望 MRU 顺序的数组），返回实际导入条数
    ///
    /// 导入条目重新分配 id、重算内容哈希；与现有历史重复的内容跳过；
    /// 保护标志原样保留；导入后按上限执行驱逐。不产生条目新增事件。
    pub fn import_json(&mut self, json: &str) -> Result<usize, EngineError> {
        let items: Vec<ClipboardItem> = serde_json::from_str(json)?;
        let mut imported = 0;

        // 数组是 MRU 顺序（最新在前），倒序头插后恰好还原原顺序
        for mut item in items.into_iter().rev() {
            let hash = dedup::content_hash(&item.payload);
            if dedup::find_duplicate(&self.store, &item.payload, hash).is_some() {
                continue;
            }
            item.id = self.ids.next_id();
            item.format = item.payload.format();
            item.content_hash = hash;
            self.store.insert(item);
            imported += 1;
        }

        log::info!("📥 导入完成，共 {} 条", imported);
        Ok(imported)
    }
}
