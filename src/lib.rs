//! # 剪贴板历史引擎 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主（UI / 事件循环）                     │
//! │                                                          │
//! │   initialize ── start/stop ── query ── take_events       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ ClipboardEngine（单线程门面）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                                                  │
//! │  ┌─ error ────── EngineError (统一错误类型)               │
//! │  │                                                       │
//! │  ├─ monitor ──── 状态机 + 回声抑制 + 捕获流水线            │
//! │  │                                                       │
//! │  ├─ classify ─── 格式优先级 + 预览/标题派生                │
//! │  │   └─ code_detection 正则代码特征                       │
//! │  │                                                       │
//! │  ├─ dedup ────── (格式, 内容哈希) 快速判重                │
//! │  ├─ history ──── arena + MRU 顺序 + 保护感知驱逐          │
//! │  ├─ query ────── 现算只读视图（搜索 / 格式过滤）           │
//! │  └─ port ─────── ClipboardPort trait                     │
//! │      └─ system   arboard + clipboard-master + Win32      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `EngineError` |
//! | [`config`] | 宿主注入的监控配置与校验 |
//! | [`item`] | 条目数据模型、id 分配、时间戳 |
//! | [`classify`] | 快照分类、预览/标题派生、代码特征检测 |
//! | [`dedup`] | 内容哈希与重复条目查找 |
//! | [`history`] | 有界历史存储与保护感知驱逐 |
//! | [`query`] | 搜索 / 格式过滤的只读视图 |
//! | [`monitor`] | 监控状态机、回声抑制、捕获流水线 |
//! | [`port`] | 系统剪贴板协作者接口与真实后端 |
//! | [`engine`] | 对宿主的统一门面与事件队列 |

pub mod classify;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod history;
pub mod item;
pub mod monitor;
pub mod port;
pub mod query;

pub use config::MonitorConfig;
pub use engine::{ClipboardEngine, EngineEvent};
pub use error::EngineError;
pub use item::{ClipFormat, ClipPayload, ClipboardItem};
pub use port::{ClipboardPort, FormatTag, ImageData, ReadGuard, WriteGuard};
