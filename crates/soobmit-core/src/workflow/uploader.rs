//! 上传编排器
//!
//! 高层 API 封装完整的上传流程:
//! 1. 探测目标是否可达 (`GET /ping`)
//! 2. 选择 / 取消选择文件
//! 3. 逐个顺序上传，聚合总进度并轮换状态文案
//! 4. 单个文件失败只提示，不中断批次
//!
//! # 状态机
//!
//! ```text
//! Start ──check──▶ CheckingReachability ──ok──▶ Uploading ──batch──▶ Success
//!   ▲                        │                                          │
//!   └────────── 失败 ────────┘                   下一批次 ◀─────────────┘
//! ```
//!
//! 上传期间编排器被 `&mut self` 独占借用，选择无法在批次中途被修改。

use crate::config::AppSettings;
use crate::error::{ReachabilityError, SessionError, TransferError};
use crate::logging::LogEntry;
use crate::transfer::{FileId, Scheme, SelectedFile, Target, Transport};
use crate::workflow::progress::{BatchProgress, StatusRotator};
use crate::workflow::selection::FileSelection;
use log::{debug, info, warn};
use std::time::Instant;
use tokio::sync::mpsc;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Start,
    CheckingReachability,
    Uploading,
    Success,
    /// 批次不会以此结束，单个文件失败只记录在报告里
    Failure,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Start => "start",
            SessionState::CheckingReachability => "checking",
            SessionState::Uploading => "uploading",
            SessionState::Success => "success",
            SessionState::Failure => "failure",
        }
    }

    /// 目标已确认可达，可以选择和上传文件
    pub fn is_reachable(&self) -> bool {
        matches!(
            self,
            SessionState::Uploading | SessionState::Success | SessionState::Failure
        )
    }
}

/// 上传失败的文件
#[derive(Debug, Clone, PartialEq)]
pub struct FailedFile {
    pub name: String,
    pub reason: String,
}

/// 一个批次的结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// 成功上传的文件名，按上传顺序
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedFile>,
    /// 批次结束时的总进度，恒为 100
    pub overall: u8,
}

/// 上传进度回调
pub trait UploadCallback: Send + Sync {
    /// 状态变化
    fn on_state(&self, state: SessionState);
    /// 进度更新：当前文件百分比与总进度
    fn on_progress(&self, file: &SelectedFile, percent: u8, overall: u8);
    /// 状态文案轮换
    fn on_status(&self, message: &str);
    /// 面向用户的提示
    fn on_notice(&self, notice: &LogEntry);
    /// 单个文件结束；`stored_as` 为 `None` 表示失败
    fn on_file_finished(&self, file: &SelectedFile, stored_as: Option<&str>);
    /// 批次结束
    fn on_batch_complete(&self, report: &BatchReport);
}

/// 上传编排器
pub struct Uploader<T: Transport> {
    transport: T,
    default_scheme: Scheme,
    state: SessionState,
    target: Option<Target>,
    selection: FileSelection,
    progress: BatchProgress,
    rotator: StatusRotator,
    uploaded: Vec<String>,
}

impl<T: Transport> Uploader<T> {
    pub fn new(transport: T, settings: &AppSettings) -> Self {
        Self {
            transport,
            default_scheme: settings.default_scheme,
            state: SessionState::Start,
            target: None,
            selection: FileSelection::default(),
            progress: BatchProgress::default(),
            rotator: StatusRotator::new(
                settings.rotation_step_percent,
                settings.rotation_interval(),
                Instant::now(),
            ),
            uploaded: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    /// 本次会话中所有成功上传的文件名
    pub fn uploaded(&self) -> &[String] {
        &self.uploaded
    }

    pub fn overall_progress(&self) -> u8 {
        self.progress.overall()
    }

    fn set_state<C: UploadCallback>(&mut self, state: SessionState, callback: &C) {
        if self.state != state {
            debug!("Session state: {} -> {}", self.state.name(), state.name());
            self.state = state;
            callback.on_state(state);
        }
    }

    /// 探测目标是否可达
    ///
    /// 任何失败都回到 `Start` 并给出提示，不自动重试。
    pub async fn check_reachability<C: UploadCallback>(
        &mut self,
        input: &str,
        callback: &C,
    ) -> Result<(), ReachabilityError> {
        let target = match Target::parse(input, self.default_scheme) {
            Ok(target) => target,
            Err(e) => {
                self.set_state(SessionState::Start, callback);
                callback.on_notice(&LogEntry::warn("Please enter a target address"));
                return Err(e);
            }
        };

        self.set_state(SessionState::CheckingReachability, callback);
        info!("Checking reachability of {}", target);

        match self.transport.ping(&target).await {
            Ok(response) => {
                info!("{} is reachable: {}", target, response.message);
                self.target = Some(target);
                self.set_state(SessionState::Uploading, callback);
                Ok(())
            }
            Err(source) => {
                warn!("{} is not reachable: {}", target, source);
                self.target = None;
                self.set_state(SessionState::Start, callback);
                callback.on_notice(&LogEntry::error(format!("{} is not reachable", target)));
                Err(ReachabilityError::Unreachable {
                    target: target.to_string(),
                    source,
                })
            }
        }
    }

    /// 替换当前选择
    pub fn select_files(&mut self, selection: FileSelection) {
        debug!(
            "Selected {} file(s), {} bytes",
            selection.len(),
            selection.total_bytes()
        );
        self.selection = selection;
    }

    /// 取消选择单个文件
    pub fn deselect(&mut self, id: FileId) -> Option<SelectedFile> {
        self.selection.remove(id)
    }

    /// 按选择顺序逐个上传
    ///
    /// 单个文件失败只产生提示并继续下一个。批次结束后总进度为 100，
    /// 成功的文件名追加到已上传列表，选择被清空，状态进入 `Success`。
    /// 失败的文件只记录在 [`BatchReport::failed`] 里。
    pub async fn upload_all<C: UploadCallback>(
        &mut self,
        callback: &C,
    ) -> Result<BatchReport, SessionError> {
        let target = match (&self.target, self.state.is_reachable()) {
            (Some(target), true) => target.clone(),
            _ => {
                callback.on_notice(&LogEntry::warn("Check that the target is reachable first"));
                return Err(SessionError::NotReachable);
            }
        };

        if self.selection.is_empty() {
            callback.on_notice(&LogEntry::warn("No files selected."));
            return Err(SessionError::EmptySelection);
        }

        let files = self.selection.files().to_vec();
        info!(
            "Uploading {} file(s) ({} bytes) to {}",
            files.len(),
            self.selection.total_bytes(),
            target
        );

        self.set_state(SessionState::Uploading, callback);
        self.progress = BatchProgress::new(&files);
        self.rotator.reset(Instant::now());
        callback.on_status(self.rotator.current());

        let mut report = BatchReport::default();

        for file in &files {
            let progress = &mut self.progress;
            let rotator = &mut self.rotator;
            let mut on_progress = |percent: u8| {
                let overall = progress.update(file.id, percent);
                let percent = progress.file_percent(file.id).unwrap_or(percent);
                callback.on_progress(file, percent, overall);
                if let Some(message) = rotator.observe(overall, Instant::now()) {
                    callback.on_status(message);
                }
            };

            match self.transport.upload(&target, file, &mut on_progress).await {
                Ok(response) => {
                    callback.on_file_finished(file, Some(&response.filename));
                    report.uploaded.push(file.name.clone());
                }
                Err(source) => {
                    let error = TransferError {
                        file: file.name.clone(),
                        source,
                    };
                    warn!("{}: {}", error, error.source);
                    callback.on_notice(&LogEntry::error(format!(
                        "File upload failed: {}",
                        file.name
                    )));
                    callback.on_file_finished(file, None);
                    report.failed.push(FailedFile {
                        name: file.name.clone(),
                        reason: error.source.to_string(),
                    });
                }
            }
        }

        report.overall = self.progress.complete();
        self.uploaded.extend(report.uploaded.iter().cloned());
        self.selection.clear();

        info!(
            "Batch finished: {} uploaded, {} failed",
            report.uploaded.len(),
            report.failed.len()
        );

        self.set_state(SessionState::Success, callback);
        callback.on_notice(&LogEntry::info(format!(
            "Uploaded {} of {} file(s)",
            report.uploaded.len(),
            files.len()
        )));
        callback.on_batch_complete(&report);

        Ok(report)
    }
}

/// 通过 channel 转发事件的回调实现
pub struct SimpleUploadCallback {
    tx: mpsc::Sender<UploadEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    State(SessionState),
    Progress {
        file_id: FileId,
        file_name: String,
        percent: u8,
        overall: u8,
    },
    Status(String),
    Notice(LogEntry),
    FileFinished {
        file_id: FileId,
        file_name: String,
        stored_as: Option<String>,
    },
    BatchComplete(BatchReport),
}

impl SimpleUploadCallback {
    pub fn new() -> (Self, mpsc::Receiver<UploadEvent>) {
        let (tx, rx) = mpsc::channel(256);
        (Self { tx }, rx)
    }
}

impl UploadCallback for SimpleUploadCallback {
    fn on_state(&self, state: SessionState) {
        let _ = self.tx.try_send(UploadEvent::State(state));
    }

    fn on_progress(&self, file: &SelectedFile, percent: u8, overall: u8) {
        let _ = self.tx.try_send(UploadEvent::Progress {
            file_id: file.id,
            file_name: file.name.clone(),
            percent,
            overall,
        });
    }

    fn on_status(&self, message: &str) {
        let _ = self.tx.try_send(UploadEvent::Status(message.to_string()));
    }

    fn on_notice(&self, notice: &LogEntry) {
        let _ = self.tx.try_send(UploadEvent::Notice(notice.clone()));
    }

    fn on_file_finished(&self, file: &SelectedFile, stored_as: Option<&str>) {
        let _ = self.tx.try_send(UploadEvent::FileFinished {
            file_id: file.id,
            file_name: file.name.clone(),
            stored_as: stored_as.map(str::to_string),
        });
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        let _ = self.tx.try_send(UploadEvent::BatchComplete(report.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{PingResponse, ProgressFn, TransportError, UploadResponse};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// 按文件名预设进度序列和结果的假传输层
    #[derive(Default)]
    struct MockTransport {
        reachable: bool,
        scripts: HashMap<String, (Vec<u8>, bool)>,
        pings: Mutex<usize>,
        uploads: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn reachable() -> Self {
            Self {
                reachable: true,
                ..Default::default()
            }
        }

        fn script(mut self, name: &str, steps: &[u8], ok: bool) -> Self {
            self.scripts.insert(name.to_string(), (steps.to_vec(), ok));
            self
        }

        fn upload_calls(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn ping(&self, _target: &Target) -> Result<PingResponse, TransportError> {
            *self.pings.lock().unwrap() += 1;
            if self.reachable {
                Ok(PingResponse::reachable())
            } else {
                Err(TransportError::Status(503))
            }
        }

        async fn upload(
            &self,
            _target: &Target,
            file: &SelectedFile,
            on_progress: ProgressFn<'_>,
        ) -> Result<UploadResponse, TransportError> {
            self.uploads.lock().unwrap().push(file.name.clone());
            let (steps, ok) = self
                .scripts
                .get(&file.name)
                .cloned()
                .unwrap_or((vec![100], true));
            for step in steps {
                on_progress(step);
                tokio::task::yield_now().await;
            }
            if ok {
                Ok(UploadResponse::stored(format!("ts_{}", file.name)))
            } else {
                Err(TransportError::Status(500))
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<UploadEvent>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<UploadEvent> {
            self.events.lock().unwrap().clone()
        }

        fn states(&self) -> Vec<SessionState> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    UploadEvent::State(s) => Some(s),
                    _ => None,
                })
                .collect()
        }

        fn overalls(&self) -> Vec<u8> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    UploadEvent::Progress { overall, .. } => Some(overall),
                    _ => None,
                })
                .collect()
        }

        fn notices(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    UploadEvent::Notice(n) => Some(n.message),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, event: UploadEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl UploadCallback for Recorder {
        fn on_state(&self, state: SessionState) {
            self.push(UploadEvent::State(state));
        }

        fn on_progress(&self, file: &SelectedFile, percent: u8, overall: u8) {
            self.push(UploadEvent::Progress {
                file_id: file.id,
                file_name: file.name.clone(),
                percent,
                overall,
            });
        }

        fn on_status(&self, message: &str) {
            self.push(UploadEvent::Status(message.to_string()));
        }

        fn on_notice(&self, notice: &LogEntry) {
            self.push(UploadEvent::Notice(notice.clone()));
        }

        fn on_file_finished(&self, file: &SelectedFile, stored_as: Option<&str>) {
            self.push(UploadEvent::FileFinished {
                file_id: file.id,
                file_name: file.name.clone(),
                stored_as: stored_as.map(str::to_string),
            });
        }

        fn on_batch_complete(&self, report: &BatchReport) {
            self.push(UploadEvent::BatchComplete(report.clone()));
        }
    }

    fn selection(files: &[(&str, u64)]) -> FileSelection {
        FileSelection::new(
            files
                .iter()
                .map(|(name, size)| SelectedFile::new(format!("/tmp/{}", name), *name, *size))
                .collect(),
        )
    }

    async fn reachable_uploader(transport: MockTransport) -> (Uploader<Arc<MockTransport>>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let mut uploader = Uploader::new(transport.clone(), &AppSettings::default());
        uploader
            .check_reachability("10.0.0.2:3000", &Recorder::default())
            .await
            .unwrap();
        (uploader, transport)
    }

    #[tokio::test]
    async fn test_reachable_moves_to_uploading() {
        let recorder = Recorder::default();
        let mut uploader = Uploader::new(MockTransport::reachable(), &AppSettings::default());

        uploader.check_reachability("10.0.0.2", &recorder).await.unwrap();

        assert_eq!(uploader.state(), SessionState::Uploading);
        assert_eq!(
            recorder.states(),
            [SessionState::CheckingReachability, SessionState::Uploading]
        );
        assert_eq!(uploader.target().unwrap().to_string(), "https://10.0.0.2");
    }

    #[tokio::test]
    async fn test_unreachable_returns_to_start() {
        let recorder = Recorder::default();
        let mut uploader = Uploader::new(MockTransport::default(), &AppSettings::default());

        let err = uploader
            .check_reachability("10.0.0.9", &recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, ReachabilityError::Unreachable { .. }));
        assert_eq!(uploader.state(), SessionState::Start);
        assert!(!recorder.states().contains(&SessionState::Uploading));
        assert_eq!(
            recorder.states(),
            [SessionState::CheckingReachability, SessionState::Start]
        );
        assert_eq!(recorder.notices(), ["https://10.0.0.9 is not reachable"]);
        assert!(uploader.target().is_none());
    }

    #[tokio::test]
    async fn test_empty_target_skips_network() {
        let transport = Arc::new(MockTransport::reachable());
        let recorder = Recorder::default();
        let mut uploader = Uploader::new(transport.clone(), &AppSettings::default());

        let err = uploader.check_reachability("  ", &recorder).await.unwrap_err();

        assert!(matches!(err, ReachabilityError::EmptyTarget));
        assert_eq!(*transport.pings.lock().unwrap(), 0);
        assert_eq!(uploader.state(), SessionState::Start);
        assert_eq!(recorder.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_is_noop() {
        let (mut uploader, transport) = reachable_uploader(MockTransport::reachable()).await;
        let recorder = Recorder::default();

        let err = uploader.upload_all(&recorder).await.unwrap_err();

        assert_eq!(err, SessionError::EmptySelection);
        assert_eq!(uploader.state(), SessionState::Uploading);
        assert!(recorder.states().is_empty());
        assert!(transport.upload_calls().is_empty());
        assert_eq!(recorder.notices(), ["No files selected."]);
    }

    #[tokio::test]
    async fn test_upload_before_reachability_rejected() {
        let transport = Arc::new(MockTransport::reachable());
        let recorder = Recorder::default();
        let mut uploader = Uploader::new(transport.clone(), &AppSettings::default());
        uploader.select_files(selection(&[("a.txt", 4)]));

        let err = uploader.upload_all(&recorder).await.unwrap_err();

        assert_eq!(err, SessionError::NotReachable);
        assert_eq!(uploader.state(), SessionState::Start);
        assert!(transport.upload_calls().is_empty());
        assert_eq!(uploader.selection().len(), 1);
    }

    #[tokio::test]
    async fn test_weighted_progress_example() {
        let transport = MockTransport::reachable()
            .script("small", &[50], true)
            .script("large", &[0], true);
        let (mut uploader, _) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("small", 10), ("large", 30)]));

        uploader.upload_all(&recorder).await.unwrap();

        let overalls = recorder.overalls();
        assert_eq!(overalls, [12, 12]);
    }

    #[tokio::test]
    async fn test_failure_does_not_halt_batch() {
        let transport = MockTransport::reachable()
            .script("one.txt", &[30, 100], true)
            .script("two.txt", &[10], false)
            .script("three.txt", &[100], true);
        let (mut uploader, transport) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("one.txt", 5), ("two.txt", 5), ("three.txt", 5)]));

        let report = uploader.upload_all(&recorder).await.unwrap();

        assert_eq!(transport.upload_calls(), ["one.txt", "two.txt", "three.txt"]);
        assert_eq!(report.uploaded, ["one.txt", "three.txt"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "two.txt");
        assert_eq!(uploader.uploaded(), ["one.txt", "three.txt"]);
        assert!(recorder.notices().contains(&"File upload failed: two.txt".to_string()));
        assert_eq!(uploader.state(), SessionState::Success);
    }

    #[tokio::test]
    async fn test_batch_ends_at_hundred() {
        let transport = MockTransport::reachable()
            .script("a", &[10], true)
            .script("b", &[20], true);
        let (mut uploader, _) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("a", 100), ("b", 100)]));

        let report = uploader.upload_all(&recorder).await.unwrap();

        assert_eq!(report.overall, 100);
        assert_eq!(uploader.overall_progress(), 100);
        assert!(uploader.selection().is_empty());
        assert!(matches!(
            recorder.events().last(),
            Some(UploadEvent::BatchComplete(r)) if r.overall == 100
        ));
    }

    #[tokio::test]
    async fn test_zero_byte_batch() {
        let (mut uploader, _) = reachable_uploader(MockTransport::reachable()).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("empty1", 0), ("empty2", 0)]));

        let report = uploader.upload_all(&recorder).await.unwrap();

        assert!(recorder.overalls().iter().all(|o| *o == 0));
        assert_eq!(report.overall, 100);
    }

    #[tokio::test]
    async fn test_progress_monotonic_with_regressing_transport() {
        let transport = MockTransport::reachable()
            .script("a", &[40, 20, 90, 60, 100], true)
            .script("b", &[5, 3, 50], false)
            .script("c", &[70, 10, 100], true);
        let (mut uploader, _) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("a", 700), ("b", 20), ("c", 333)]));

        uploader.upload_all(&recorder).await.unwrap();

        let overalls = recorder.overalls();
        assert!(!overalls.is_empty());
        assert!(overalls.windows(2).all(|w| w[0] <= w[1]), "{:?}", overalls);
    }

    #[tokio::test]
    async fn test_all_failed_still_ends_in_success() {
        let transport = MockTransport::reachable().script("bad", &[50], false);
        let (mut uploader, _) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("bad", 10)]));

        let report = uploader.upload_all(&recorder).await.unwrap();

        assert!(report.uploaded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "bad");
        assert_eq!(report.overall, 100);
        assert_eq!(uploader.state(), SessionState::Success);
        assert!(!recorder.states().contains(&SessionState::Failure));
        assert!(recorder.notices().iter().any(|n| n == "File upload failed: bad"));
        assert!(uploader.uploaded().is_empty());
    }

    #[tokio::test]
    async fn test_uploaded_list_accumulates_across_batches() {
        let (mut uploader, _) = reachable_uploader(MockTransport::reachable()).await;
        let recorder = Recorder::default();

        uploader.select_files(selection(&[("first", 1)]));
        uploader.upload_all(&recorder).await.unwrap();
        uploader.select_files(selection(&[("second", 1)]));
        uploader.upload_all(&recorder).await.unwrap();

        assert_eq!(uploader.uploaded(), ["first", "second"]);
        assert_eq!(uploader.state(), SessionState::Success);
    }

    #[tokio::test]
    async fn test_deselect_before_upload() {
        let (mut uploader, transport) = reachable_uploader(MockTransport::reachable()).await;
        let recorder = Recorder::default();
        let chosen = selection(&[("keep", 1), ("drop", 1)]);
        let drop_id = chosen.files()[1].id;
        uploader.select_files(chosen);

        assert_eq!(uploader.deselect(drop_id).unwrap().name, "drop");
        uploader.upload_all(&recorder).await.unwrap();

        assert_eq!(transport.upload_calls(), ["keep"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_tracked_separately() {
        let transport = MockTransport::reachable().script("same.txt", &[100], true);
        let (mut uploader, transport) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("same.txt", 10), ("same.txt", 30)]));

        let report = uploader.upload_all(&recorder).await.unwrap();

        assert_eq!(transport.upload_calls().len(), 2);
        assert_eq!(report.uploaded, ["same.txt", "same.txt"]);
        // 第一个文件 100% 只占总字节的 1/4
        assert_eq!(recorder.overalls(), [25, 100]);
    }

    #[tokio::test]
    async fn test_status_rotates_during_batch() {
        let transport = MockTransport::reachable().script("big", &[1, 2, 6, 7, 12], true);
        let (mut uploader, _) = reachable_uploader(transport).await;
        let recorder = Recorder::default();
        uploader.select_files(selection(&[("big", 100)]));

        uploader.upload_all(&recorder).await.unwrap();

        let statuses: Vec<_> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                UploadEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect();
        // 初始文案 + 6% 与 12% 两次轮换
        assert_eq!(statuses.len(), 3);
        assert_ne!(statuses[0], statuses[1]);
    }

    #[tokio::test]
    async fn test_simple_callback_forwards_events() {
        let (callback, mut rx) = SimpleUploadCallback::new();
        let mut uploader = Uploader::new(MockTransport::reachable(), &AppSettings::default());

        uploader.check_reachability("host", &callback).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(UploadEvent::State(SessionState::CheckingReachability))
        );
        assert_eq!(rx.recv().await, Some(UploadEvent::State(SessionState::Uploading)));
    }
}
