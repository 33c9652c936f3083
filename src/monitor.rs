//! 剪贴板监控模块
//!
//! # 设计思路
//!
//! `MonitorController` 是 `Stopped / Monitoring` 两态状态机：`start()`
//! 向系统剪贴板协作者注册变化回调并立刻做一次捕获（历史从一开始就
//! 反映剪贴板当前内容）；`stop()` 注销回调。两者都幂等。
//!
//! **回声抑制**：引擎自己写剪贴板（"从历史复制"）也会触发系统变化
//! 通知。写入前先武装一个布尔标志，下一条通知若发现标志被置位则
//! 消费标志并跳过捕获。已知局限：若系统没有回照本应用的写入，标志
//! 会保持武装直到吞掉下一条**真实**的外部变化——为兼容性保留此行为，
//! 不在此处"修复"（更稳妥的方案是对上次自写内容做哈希比对）。
//!
//! # 实现思路
//!
//! - 通知回调可能在后端线程触发，经 `std::sync::mpsc` 通道转回宿主
//!   事件循环线程；`pump` / `pump_wait` 在该线程按送达顺序串行处理，
//!   存储的全部变更都发生在泵线程上，无需加锁。
//! - 捕获流水线 fail-closed：任何一步失败只记日志并丢弃本次事件，
//!   绝不向调用方抛错，也绝不让监控循环崩溃。
//! - 读 guard 在进入存储变更之前 drop，遵守"获取—使用—释放"。

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::classify::{self, ClipboardSnapshot};
use crate::config::MonitorConfig;
use crate::dedup;
use crate::engine::EngineEvent;
use crate::error::EngineError;
use crate::history::HistoryStore;
use crate::item::{self, ClipFormat, ClipboardItem, IdAllocator};
use crate::port::{ClipboardPort, FormatTag};

/// 监控状态机的两个状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Monitoring,
}

/// 监控控制器：订阅管理 + 回声抑制 + 捕获驱动
#[derive(Debug)]
pub struct MonitorController {
    state: MonitorState,
    /// 回声抑制标志：引擎写剪贴板前置位，下一条通知消费后清除
    suppress_next: bool,
    rx: Option<Receiver<()>>,
}

impl Default for MonitorController {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorController {
    pub fn new() -> Self {
        Self {
            state: MonitorState::Stopped,
            suppress_next: false,
            rx: None,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.state == MonitorState::Monitoring
    }

    /// `Stopped → Monitoring`；已在监控中则为空操作
    ///
    /// 注册变化回调后立刻执行一次捕获，让历史反映剪贴板当前内容。
    pub fn start(
        &mut self,
        port: &mut dyn ClipboardPort,
        store: &mut HistoryStore,
        config: &MonitorConfig,
        ids: &mut IdAllocator,
        events: &mut VecDeque<EngineEvent>,
    ) -> Result<(), EngineError> {
        if self.is_monitoring() {
            log::debug!("📋 监控已在运行，忽略重复启动");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        port.subscribe(Box::new(move || {
            let _ = tx.send(());
        }))?;
        self.rx = Some(rx);
        self.state = MonitorState::Monitoring;
        log::info!("📋 剪贴板监听已启动");

        capture_once(port, store, config, ids, events);
        Ok(())
    }

    /// `Monitoring → Stopped`；已停止则为空操作
    pub fn stop(&mut self, port: &mut dyn ClipboardPort) {
        if !self.is_monitoring() {
            return;
        }
        port.unsubscribe();
        self.rx = None;
        self.state = MonitorState::Stopped;
        log::info!("📋 剪贴板监听已停止");
    }

    /// 武装回声抑制标志，必须在引擎发起剪贴板写入**之前**调用
    pub fn arm_suppression(&mut self) {
        self.suppress_next = true;
        log::debug!("🚫 已武装回声抑制标志，下一条剪贴板变化通知将被吞掉");
    }

    /// 排空已积压的变化通知，按送达顺序逐条处理，返回处理条数
    pub fn pump(
        &mut self,
        port: &mut dyn ClipboardPort,
        store: &mut HistoryStore,
        config: &MonitorConfig,
        ids: &mut IdAllocator,
        events: &mut VecDeque<EngineEvent>,
    ) -> usize {
        let mut handled = 0;
        loop {
            let got = match &self.rx {
                Some(rx) => rx.try_recv().is_ok(),
                None => false,
            };
            if !got {
                break;
            }
            self.handle_notification(port, store, config, ids, events);
            handled += 1;
        }
        handled
    }

    /// 最多等待 `timeout` 拿到第一条通知，然后排空积压，返回处理条数
    ///
    /// 供宿主事件循环阻塞驱动使用；未在监控中时立即返回 0。
    pub fn pump_wait(
        &mut self,
        timeout: Duration,
        port: &mut dyn ClipboardPort,
        store: &mut HistoryStore,
        config: &MonitorConfig,
        ids: &mut IdAllocator,
        events: &mut VecDeque<EngineEvent>,
    ) -> usize {
        let got = match &self.rx {
            Some(rx) => rx.recv_timeout(timeout).is_ok(),
            None => return 0,
        };
        if !got {
            return 0;
        }
        self.handle_notification(port, store, config, ids, events);
        1 + self.pump(port, store, config, ids, events)
    }

    fn handle_notification(
        &mut self,
        port: &mut dyn ClipboardPort,
        store: &mut HistoryStore,
        config: &MonitorConfig,
        ids: &mut IdAllocator,
        events: &mut VecDeque<EngineEvent>,
    ) {
        if self.suppress_next {
            self.suppress_next = false;
            log::debug!("⏭️  忽略应用主动触发的剪贴板变化");
            return;
        }
        capture_once(port, store, config, ids, events);
    }
}

/// 捕获流水线（fail-closed：任何失败都只记日志并丢弃本次事件）
///
/// 读访问 → 快照 → 分类 → 策略门（大小 / 排除应用 / 格式开关）→
/// 去重（命中则更新时间并提升）→ 插入（内含驱逐）→ 发出条目新增事件。
pub fn capture_once(
    port: &mut dyn ClipboardPort,
    store: &mut HistoryStore,
    config: &MonitorConfig,
    ids: &mut IdAllocator,
    events: &mut VecDeque<EngineEvent>,
) {
    let source_app = port.foreground_app_label();

    let snapshot = match read_snapshot(port) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::warn!("📋 打开剪贴板读访问失败，丢弃本次事件: {}", err);
            return;
        }
    };

    let Some(classified) = classify::classify(snapshot, &source_app, config.skip_code_preview_images)
    else {
        log::debug!("⏭️  剪贴板内容无法归类，跳过捕获");
        return;
    };

    // 策略门：超大、来源被排除、格式开关关闭——静默丢弃，不算错误
    if classified.size_bytes > config.max_item_size_bytes {
        log::debug!(
            "🚫 条目过大（{} > {} 字节），跳过捕获",
            classified.size_bytes,
            config.max_item_size_bytes
        );
        return;
    }
    if config.is_app_excluded(&source_app) {
        log::debug!("🚫 来源应用命中排除列表（{}），跳过捕获", source_app);
        return;
    }
    let format = classified.payload.format();
    let format_enabled = match format {
        ClipFormat::Image => config.save_images,
        ClipFormat::FileList => config.save_files,
        ClipFormat::RichText => config.save_rich_text,
        ClipFormat::Text => true,
    };
    if !format_enabled {
        log::debug!("🚫 格式 {:?} 的捕获开关已关闭，跳过", format);
        return;
    }

    let now = item::now_millis();
    let hash = dedup::content_hash(&classified.payload);

    if let Some(dup_id) = dedup::find_duplicate(store, &classified.payload, hash) {
        store.touch(dup_id, now);
        store.promote(dup_id);
        log::debug!("🔁 重复内容再捕获，提升条目 id={}", dup_id);
        return;
    }

    let item = ClipboardItem {
        id: ids.next_id(),
        format,
        payload: classified.payload,
        preview: classified.preview,
        title: classified.title,
        size_bytes: classified.size_bytes,
        source_app,
        captured_at: now,
        is_pinned: false,
        is_favorite: false,
        content_hash: hash,
    };
    log::info!("📋 捕获新条目 id={} [{:?}] {}", item.id, item.format, item.title);
    events.push_back(EngineEvent::ItemAdded(item.clone()));
    store.insert(item);
}

/// 持读 guard 期间把可用格式一次性读成快照；guard 在返回前释放
fn read_snapshot(port: &mut dyn ClipboardPort) -> Result<ClipboardSnapshot, EngineError> {
    let mut guard = port.open_read()?;
    let formats = guard.available_formats();
    let mut snapshot = ClipboardSnapshot::default();

    if formats.contains(&FormatTag::FileList) {
        snapshot.files = guard.read_file_list().ok();
    }
    if formats.contains(&FormatTag::Image) {
        snapshot.image = guard.read_image().ok();
    }
    if formats.contains(&FormatTag::Text) {
        snapshot.text = guard.read_text().ok();
    }
    if formats.contains(&FormatTag::RichText) {
        snapshot.rich_text = guard.read_rich_text().ok();
    }

    Ok(snapshot)
}
