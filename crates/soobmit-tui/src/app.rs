//! Application state

use std::collections::HashMap;
use std::path::PathBuf;

use soobmit_core::{
    AppSettings, BatchReport, FileId, HttpTransport, LogEntry, LogLevel, SelectedFile,
    SessionState, UploadCallback, UploadEvent, Uploader,
};
use tokio::sync::mpsc;

use crate::file_selector::FileSelector;

/// 日志面板最多保留的条目数
const MAX_LOGS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    /// 编辑目标地址
    TargetInput,
    Normal,
    FileSelection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Upload,
    Log,
}

pub enum AppEvent {
    LogMessage { level: String, message: String },
    Upload(UploadEvent),
    /// 后台任务结束，交还编排器
    UploaderReturned(Box<Uploader<HttpTransport>>),
}

/// 把编排器回调转成 [`AppEvent`]
struct AppCallback {
    tx: mpsc::Sender<AppEvent>,
}

impl AppCallback {
    fn send(&self, event: UploadEvent) {
        let _ = self.tx.try_send(AppEvent::Upload(event));
    }
}

impl UploadCallback for AppCallback {
    fn on_state(&self, state: SessionState) {
        self.send(UploadEvent::State(state));
    }

    fn on_progress(&self, file: &SelectedFile, percent: u8, overall: u8) {
        self.send(UploadEvent::Progress {
            file_id: file.id,
            file_name: file.name.clone(),
            percent,
            overall,
        });
    }

    fn on_status(&self, message: &str) {
        self.send(UploadEvent::Status(message.to_string()));
    }

    fn on_notice(&self, notice: &LogEntry) {
        self.send(UploadEvent::Notice(notice.clone()));
    }

    fn on_file_finished(&self, file: &SelectedFile, stored_as: Option<&str>) {
        self.send(UploadEvent::FileFinished {
            file_id: file.id,
            file_name: file.name.clone(),
            stored_as: stored_as.map(str::to_string),
        });
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        self.send(UploadEvent::BatchComplete(report.clone()));
    }
}

pub struct App {
    pub mode: AppMode,
    pub tab: Tab,
    pub settings: AppSettings,
    pub session: SessionState,
    pub input_buffer: String,
    pub file_selector: FileSelector,
    /// 选择列表中的光标
    pub selected_index: usize,
    /// 当前批次的文件快照，上传期间编排器不在手里时用于绘制
    pub batch_files: Vec<SelectedFile>,
    pub file_progress: HashMap<FileId, u8>,
    pub current_file: Option<FileId>,
    pub overall: u8,
    pub status_message: String,
    pub notice: Option<LogEntry>,
    pub uploaded: Vec<String>,
    pub logs: Vec<LogEntry>,
    pub min_log_level: LogLevel,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    /// 上传或探测进行中时为 `None`
    uploader: Option<Uploader<HttpTransport>>,
}

impl App {
    pub fn new(settings: AppSettings, start_dir: PathBuf) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(&settings)?;
        let uploader = Uploader::new(transport, &settings);
        let (event_tx, event_rx) = mpsc::channel(1024);

        Ok(Self {
            mode: AppMode::TargetInput,
            tab: Tab::Upload,
            input_buffer: settings.last_target.clone().unwrap_or_default(),
            min_log_level: if settings.verbose {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
            settings,
            session: SessionState::Start,
            file_selector: FileSelector::new(start_dir),
            selected_index: 0,
            batch_files: Vec::new(),
            file_progress: HashMap::new(),
            current_file: None,
            overall: 0,
            status_message: String::new(),
            notice: None,
            uploaded: Vec::new(),
            logs: vec![
                LogEntry::info("Soobmit TUI 启动"),
                LogEntry::info("输入目标地址后按 Enter 检查可达性"),
            ],
            event_tx,
            event_rx,
            uploader: Some(uploader),
        })
    }

    /// 后台任务进行中
    pub fn is_busy(&self) -> bool {
        self.uploader.is_none()
    }

    /// 当前应显示的文件列表
    pub fn selected_files(&self) -> &[SelectedFile] {
        match &self.uploader {
            Some(uploader) if !uploader.selection().is_empty() => uploader.selection().files(),
            Some(_) if self.session == SessionState::Uploading => &[],
            _ => &self.batch_files,
        }
    }

    pub fn target_label(&self) -> Option<String> {
        self.uploader
            .as_ref()
            .and_then(|u| u.target())
            .map(|t| t.to_string())
    }

    pub fn add_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }

    pub fn visible_logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs
            .iter()
            .filter(move |entry| entry.level <= self.min_log_level)
    }

    pub fn toggle_log_level(&mut self) {
        self.min_log_level = match self.min_log_level {
            LogLevel::Info => LogLevel::Debug,
            _ => LogLevel::Info,
        };
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Upload => Tab::Log,
            Tab::Log => Tab::Upload,
        };
    }

    pub fn edit_target(&mut self) {
        if !self.is_busy() {
            self.mode = AppMode::TargetInput;
        }
    }

    /// 提交目标地址并在后台探测
    pub fn submit_target(&mut self) {
        let Some(mut uploader) = self.uploader.take() else {
            return;
        };
        self.mode = AppMode::Normal;
        self.notice = None;

        let input = self.input_buffer.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let callback = AppCallback { tx: tx.clone() };
            if let Err(e) = uploader.check_reachability(&input, &callback).await {
                tracing::debug!("Reachability check failed: {}", e);
            }
            let _ = tx.send(AppEvent::UploaderReturned(Box::new(uploader))).await;
        });
    }

    /// 打开文件选择器，只有目标可达后才允许
    pub fn open_file_selector(&mut self) {
        if self.is_busy() {
            return;
        }
        if !self.session.is_reachable() {
            self.show_notice(LogEntry::warn("Check that the target is reachable first"));
            return;
        }
        match self.file_selector.refresh() {
            Ok(()) => self.mode = AppMode::FileSelection,
            Err(e) => self.show_notice(LogEntry::error(format!("无法读取目录: {}", e))),
        }
    }

    /// 把选择器中标记的文件追加到选择
    pub fn add_marked_files(&mut self) {
        self.mode = AppMode::Normal;
        let files = match self.file_selector.take_marked() {
            Ok(files) => files,
            Err(e) => {
                self.show_notice(LogEntry::error(format!("无法读取文件: {}", e)));
                return;
            }
        };
        let Some(uploader) = self.uploader.as_mut() else {
            return;
        };
        if files.is_empty() {
            return;
        }

        let mut selection = uploader.selection().clone();
        let added = files.len();
        for file in files {
            selection.push(file);
        }
        uploader.select_files(selection);
        self.add_log(LogEntry::info(format!("已添加 {} 个文件", added)));
    }

    /// 取消选择光标所在的文件
    pub fn deselect_current(&mut self) {
        let Some(uploader) = self.uploader.as_mut() else {
            return;
        };
        let Some(id) = uploader
            .selection()
            .files()
            .get(self.selected_index)
            .map(|f| f.id)
        else {
            return;
        };
        let removed = uploader.deselect(id);
        let len = uploader.selection().len();
        if let Some(file) = removed {
            self.add_log(LogEntry::info(format!("已取消选择: {}", file.name)));
        }
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    pub fn next_file(&mut self) {
        let len = self.selected_files().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn previous_file(&mut self) {
        let len = self.selected_files().len();
        if len > 0 {
            self.selected_index = self.selected_index.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// 在后台上传当前选择
    pub fn start_upload(&mut self) {
        let Some(mut uploader) = self.uploader.take() else {
            return;
        };
        self.batch_files = uploader.selection().files().to_vec();
        self.file_progress.clear();
        self.current_file = None;
        self.overall = 0;
        self.notice = None;

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let callback = AppCallback { tx: tx.clone() };
            if let Err(e) = uploader.upload_all(&callback).await {
                tracing::debug!("Batch not started: {}", e);
            }
            let _ = tx.send(AppEvent::UploaderReturned(Box::new(uploader))).await;
        });
    }

    fn show_notice(&mut self, notice: LogEntry) {
        self.add_log(notice.clone());
        self.notice = Some(notice);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LogMessage { level, message } => {
                let level = level.parse().unwrap_or(LogLevel::Info);
                self.add_log(LogEntry::new(level, message));
            }
            AppEvent::Upload(event) => self.handle_upload_event(event),
            AppEvent::UploaderReturned(uploader) => self.restore_uploader(*uploader),
        }
    }

    fn handle_upload_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::State(state) => self.session = state,
            UploadEvent::Progress {
                file_id,
                percent,
                overall,
                ..
            } => {
                self.file_progress.insert(file_id, percent);
                self.current_file = Some(file_id);
                self.overall = overall;
            }
            UploadEvent::Status(message) => self.status_message = message,
            UploadEvent::Notice(notice) => self.show_notice(notice),
            UploadEvent::FileFinished {
                file_name,
                stored_as,
                ..
            } => {
                let entry = match stored_as {
                    Some(stored) => LogEntry::info(format!("{} → {}", file_name, stored)),
                    None => LogEntry::error(format!("{} 上传失败", file_name)),
                };
                self.add_log(entry);
            }
            UploadEvent::BatchComplete(report) => {
                self.overall = report.overall;
                self.current_file = None;
            }
        }
    }

    /// 编排器回到手里后以它为准同步界面状态
    fn restore_uploader(&mut self, uploader: Uploader<HttpTransport>) {
        self.session = uploader.state();
        self.uploaded = uploader.uploaded().to_vec();
        // 事件通道满时 BatchComplete 可能丢失，总进度以编排器为准
        self.overall = uploader.overall_progress();

        if let Some(target) = uploader.target() {
            let target = target.to_string();
            if self.settings.last_target.as_deref() != Some(target.as_str()) {
                self.settings.last_target = Some(target);
                if let Err(e) = self.settings.save() {
                    tracing::warn!("Failed to save settings: {}", e);
                }
            }
        }

        if self.session == SessionState::Start {
            self.mode = AppMode::TargetInput;
        }
        self.uploader = Some(uploader);
    }

    /// 处理所有待处理的异步事件
    pub fn tick(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    #[cfg(test)]
    fn uploader_mut(&mut self) -> Option<&mut Uploader<HttpTransport>> {
        self.uploader.as_mut()
    }
}
