//! 测试用假剪贴板后端
//!
//! 实现 `ClipboardPort`，内容与回调槽位放在 `Arc<Mutex<...>>` 里，
//! 测试侧保留一个克隆句柄即可在引擎持有 port 的同时改写剪贴板内容、
//! 注入变化通知、模拟打开失败与写入回声。

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use clipboard_engine::{
    ClipboardPort, EngineError, FormatTag, ImageData, ReadGuard, WriteGuard,
};

#[derive(Default)]
struct FakeState {
    text: Option<String>,
    rich_text: Option<String>,
    image: Option<ImageData>,
    files: Option<Vec<String>>,
    foreground: String,
    fail_open_read: bool,
    /// 写入后是否立刻回照一条变化通知（模拟系统反射自写）
    echo_on_write: bool,
    written_text: Vec<String>,
    callback: Option<Box<dyn FnMut() + Send>>,
}

/// 可克隆的假剪贴板；克隆共享同一份内部状态
#[derive(Clone, Default)]
pub struct FakeClipboard {
    state: Arc<Mutex<FakeState>>,
}

impl FakeClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake clipboard lock")
    }

    /// 用纯文本替换剪贴板全部内容
    pub fn put_text(&self, text: &str) {
        let mut state = self.lock();
        state.text = Some(text.to_string());
        state.rich_text = None;
        state.image = None;
        state.files = None;
    }

    pub fn put_rich_text(&self, html: &str) {
        let mut state = self.lock();
        state.text = None;
        state.rich_text = Some(html.to_string());
        state.image = None;
        state.files = None;
    }

    pub fn put_image(&self, width: usize, height: usize, bytes: Vec<u8>) {
        let mut state = self.lock();
        state.text = None;
        state.rich_text = None;
        state.image = Some(ImageData {
            width,
            height,
            bytes,
        });
        state.files = None;
    }

    pub fn put_files(&self, files: Vec<&str>) {
        let mut state = self.lock();
        state.text = None;
        state.rich_text = None;
        state.image = None;
        state.files = Some(files.into_iter().map(String::from).collect());
    }

    /// 同时放入文本与图片（浏览器复制的典型形态）
    pub fn put_text_and_image(&self, text: &str, bytes: Vec<u8>) {
        let mut state = self.lock();
        state.text = Some(text.to_string());
        state.image = Some(ImageData {
            width: 4,
            height: 4,
            bytes,
        });
        state.rich_text = None;
        state.files = None;
    }

    pub fn clear_contents(&self) {
        let mut state = self.lock();
        state.text = None;
        state.rich_text = None;
        state.image = None;
        state.files = None;
    }

    pub fn set_foreground(&self, label: &str) {
        self.lock().foreground = label.to_string();
    }

    pub fn set_fail_open_read(&self, fail: bool) {
        self.lock().fail_open_read = fail;
    }

    pub fn set_echo_on_write(&self, echo: bool) {
        self.lock().echo_on_write = echo;
    }

    /// 注入一条系统变化通知
    pub fn emit_change(&self) {
        let mut state = self.lock();
        if let Some(cb) = state.callback.as_mut() {
            cb();
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// 引擎写回过的全部文本
    pub fn written_text(&self) -> Vec<String> {
        self.lock().written_text.clone()
    }
}

impl ClipboardPort for FakeClipboard {
    fn subscribe(&mut self, on_change: Box<dyn FnMut() + Send>) -> Result<(), EngineError> {
        self.lock().callback = Some(on_change);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.lock().callback = None;
    }

    fn open_read(&mut self) -> Result<Box<dyn ReadGuard>, EngineError> {
        let state = self.lock();
        if state.fail_open_read {
            return Err(EngineError::Clipboard("剪贴板被占用".to_string()));
        }
        Ok(Box::new(FakeReadGuard {
            text: state.text.clone(),
            rich_text: state.rich_text.clone(),
            image: state.image.clone(),
            files: state.files.clone(),
        }))
    }

    fn open_write(&mut self) -> Result<Box<dyn WriteGuard>, EngineError> {
        Ok(Box::new(FakeWriteGuard {
            state: Arc::clone(&self.state),
        }))
    }

    fn foreground_app_label(&self) -> String {
        self.lock().foreground.clone()
    }
}

struct FakeReadGuard {
    text: Option<String>,
    rich_text: Option<String>,
    image: Option<ImageData>,
    files: Option<Vec<String>>,
}

impl ReadGuard for FakeReadGuard {
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
        if self.rich_text.is_some() {
            formats.push(FormatTag::RichText);
        }
        formats
    }

    fn read_text(&mut self) -> Result<String, EngineError> {
        self.text
            .clone()
            .ok_or_else(|| EngineError::Clipboard("no text".to_string()))
    }

    fn read_rich_text(&mut self) -> Result<String, EngineError> {
        self.rich_text
            .clone()
            .ok_or_else(|| EngineError::Clipboard("no rich text".to_string()))
    }

    fn read_image(&mut self) -> Result<ImageData, EngineError> {
        self.image
            .clone()
            .ok_or_else(|| EngineError::Clipboard("no image".to_string()))
    }

    fn read_file_list(&mut self) -> Result<Vec<String>, EngineError> {
        self.files
            .clone()
            .ok_or_else(|| EngineError::Clipboard("no files".to_string()))
    }
}

struct FakeWriteGuard {
    state: Arc<Mutex<FakeState>>,
}

impl WriteGuard for FakeWriteGuard {
    fn write_text(&mut self, text: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("fake clipboard lock");
        state.text = Some(text.to_string());
        state.written_text.push(text.to_string());
        if state.echo_on_write {
            if let Some(cb) = state.callback.as_mut() {
                cb();
            }
        }
        Ok(())
    }

    fn write_image(&mut self, image: &ImageData) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("fake clipboard lock");
        state.image = Some(image.clone());
        if state.echo_on_write {
            if let Some(cb) = state.callback.as_mut() {
                cb();
            }
        }
        Ok(())
    }
}
