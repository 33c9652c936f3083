//! 系统剪贴板后端
//!
//! # 设计思路
//!
//! `ClipboardPort` 的真实实现：文本 / 图片读写委托 `arboard`，变化订阅
//! 委托 `clipboard-master`（独立线程运行 `Master`，退出后指数退避重启），
//! Windows 上经 Win32 读取 CF_HDROP 文件列表与前台窗口标题，其余平台
//! 返回尽力而为的空回退。
//!
//! # 实现思路
//!
//! - 监听线程只负责把"变了"这一事实转发给注册的回调，回调槽位放在
//!   `Arc<Mutex<Option<...>>>` 里：`subscribe` 装入、`unsubscribe` 清空，
//!   线程本身一经启动就常驻，避免依赖后端的停止语义。
//! - 读 guard 在构造时一次性抓快照（文件列表 → 图片 → 文本），
//!   之后从缓存应答；系统后端不支持读富文本，格式集合里不会出现它。

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clipboard_master::{CallbackResult, ClipboardHandler, Master};

use super::{ClipboardPort, FormatTag, ImageData, ReadGuard, WriteGuard};
use crate::error::EngineError;

const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

type ChangeCallback = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

/// 系统剪贴板协作者（arboard + clipboard-master）
pub struct SystemClipboard {
    callback: ChangeCallback,
    listener_started: bool,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            callback: Arc::new(Mutex::new(None)),
            listener_started: false,
        }
    }

    /// 启动常驻监听线程（仅首次订阅时）
    fn ensure_listener(&mut self) {
        if self.listener_started {
            return;
        }
        self.listener_started = true;

        let callback = Arc::clone(&self.callback);
        thread::spawn(move || {
            let mut restart_attempt: u32 = 0;
            loop {
                match Master::new(ForwardHandler {
                    callback: Arc::clone(&callback),
                }) {
                    Ok(mut master) => {
                        restart_attempt = 0;
                        log::info!("📋 系统剪贴板监听线程已启动");
                        let _ = master.run();
                        log::warn!("📋 系统剪贴板监听已退出，将尝试重启");
                    }
                    Err(err) => {
                        log::error!("📋 创建系统剪贴板监听失败: {}", err);
                    }
                }

                restart_attempt = restart_attempt.saturating_add(1);
                let backoff_ms = compute_restart_backoff_ms(restart_attempt);
                log::warn!(
                    "📋 系统剪贴板监听 {}ms 后重试（attempt={}）",
                    backoff_ms,
                    restart_attempt
                );
                thread::sleep(Duration::from_millis(backoff_ms));
            }
        });
    }
}

/// 把系统变化事件转发给注册的回调
struct ForwardHandler {
    callback: ChangeCallback,
}

impl ClipboardHandler for ForwardHandler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        match self.callback.lock() {
            Ok(mut slot) => {
                if let Some(cb) = slot.as_mut() {
                    cb();
                }
            }
            Err(_) => log::warn!("📋 变化回调槽位锁中毒，本次通知丢失"),
        }
        CallbackResult::Next
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

impl ClipboardPort for SystemClipboard {
    fn subscribe(&mut self, on_change: Box<dyn FnMut() + Send>) -> Result<(), EngineError> {
        self.ensure_listener();
        let mut slot = self
            .callback
            .lock()
            .map_err(|_| EngineError::Clipboard("变化回调槽位锁中毒".to_string()))?;
        *slot = Some(on_change);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = None;
        }
    }

    fn open_read(&mut self) -> Result<Box<dyn ReadGuard>, EngineError> {
        let files = read_file_list_win32();

        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| EngineError::Clipboard(e.to_string()))?;

        let text = clipboard.get_text().ok().filter(|t| !t.is_empty());
        let image = clipboard.get_image().ok().map(|img| ImageData {
            width: img.width,
            height: img.height,
            bytes: img.bytes.into_owned(),
        });

        Ok(Box::new(SystemReadGuard { text, image, files }))
    }

    fn open_write(&mut self) -> Result<Box<dyn WriteGuard>, EngineError> {
        let clipboard = arboard::Clipboard::new()
            .map_err(|e| EngineError::Clipboard(e.to_string()))?;
        Ok(Box::new(SystemWriteGuard { clipboard }))
    }

    fn foreground_app_label(&self) -> String {
        foreground_window_title()
    }
}

/// 读 guard：构造时抓好快照，之后从缓存应答
struct SystemReadGuard {
    text: Option<String>,
    image: Option<ImageData>,
    files: Option<Vec<String>>,
}

impl ReadGuard for SystemReadGuard {
    fn available_formats(&mut self) -> Vec<FormatTag> {
        let mut formats = Vec::new();
        if self.files.is_some() {
            formats.push(FormatTag::FileList);
        }
        if self.image.is_some() {
            formats.push(FormatTag::Image);
        }
        if self.text.is_some() {
            formats.push(FormatTag::Text);
        }
        formats
    }

    fn read_text(&mut self) -> Result<String, EngineError> {
        self.text
            .clone()
            .ok_or_else(|| EngineError::Clipboard("剪贴板上没有文本".to_string()))
    }

    fn read_rich_text(&mut self) -> Result<String, EngineError> {
        Err(EngineError::Clipboard(
            "系统后端不支持读取富文本".to_string(),
        ))
    }

    fn read_image(&mut self) -> Result<ImageData, EngineError> {
        self.image
            .clone()
            .ok_or_else(|| EngineError::Clipboard("剪贴板上没有图片".to_string()))
    }

    fn read_file_list(&mut self) -> Result<Vec<String>, EngineError> {
        self.files
            .clone()
            .ok_or_else(|| EngineError::Clipboard("剪贴板上没有文件列表".to_string()))
    }
}

struct SystemWriteGuard {
    clipboard: arboard::Clipboard,
}

impl WriteGuard for SystemWriteGuard {
    fn write_text(&mut self, text: &str) -> Result<(), EngineError> {
        self.clipboard
            .set_text(text.to_string())
            .map_err(|e| EngineError::Clipboard(e.to_string()))
    }

    fn write_image(&mut self, image: &ImageData) -> Result<(), EngineError> {
        self.clipboard
            .set_image(arboard::ImageData {
                width: image.width,
                height: image.height,
                bytes: std::borrow::Cow::Owned(image.bytes.clone()),
            })
            .map_err(|e| EngineError::Clipboard(e.to_string()))
    }
}

// ============================================================================
// Win32 专属：CF_HDROP 文件列表 + 前台窗口标题
// ============================================================================

/// 读取 CF_HDROP 文件列表（Windows 专用，失败或无文件时返回 None）
#[cfg(target_os = "windows")]
fn read_file_list_win32() -> Option<Vec<String>> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::System::Ole::CF_HDROP;
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    unsafe {
        if OpenClipboard(None).is_err() {
            return None;
        }

        let result = (|| -> Option<Vec<String>> {
            let handle = GetClipboardData(CF_HDROP.0 as u32).ok()?;

            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);
            if count == 0 {
                return None;
            }

            let mut files = Vec::with_capacity(count as usize);
            for i in 0..count {
                let len = DragQueryFileW(hdrop, i, None);
                if len == 0 {
                    continue;
                }

                let mut buf = vec![0u16; (len + 1) as usize];
                DragQueryFileW(hdrop, i, Some(&mut buf));

                if let Some(pos) = buf.iter().position(|&c| c == 0) {
                    buf.truncate(pos);
                }

                files.push(OsString::from_wide(&buf).to_string_lossy().to_string());
            }

            if files.is_empty() {
                None
            } else {
                log::debug!("📁 从剪贴板读取到 {} 个文件", files.len());
                Some(files)
            }
        })();

        let _ = CloseClipboard();
        result
    }
}

#[cfg(not(target_os = "windows"))]
fn read_file_list_win32() -> Option<Vec<String>> {
    None
}

/// 前台窗口标题（Windows 专用，失败时返回空串）
#[cfg(target_os = "windows")]
fn foreground_window_title() -> String {
    use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

    unsafe {
        let hwnd = GetForegroundWindow();
        if hwnd.is_invalid() {
            return String::new();
        }
        let mut buf = [0u16; 256];
        let len = GetWindowTextW(hwnd, &mut buf);
        if len <= 0 {
            return String::new();
        }
        String::from_utf16_lossy(&buf[..len as usize])
    }
}

#[cfg(not(target_os = "windows"))]
fn foreground_window_title() -> String {
    String::new()
}
