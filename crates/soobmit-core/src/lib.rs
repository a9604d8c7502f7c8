//! Soobmit Core Library
//!
//! 把文件上传到任意目标主机的核心实现库。
//!
//! # 模块
//!
//! - **config**: 应用设置的读取与保存
//! - **logging**: 日志级别和条目（也用作用户提示）
//! - **transfer**: 目标地址、HTTP 上传客户端、上传端点服务器
//! - **workflow**: 上传编排器（可达性探测、顺序上传、进度聚合）
//!
//! # 使用示例
//!
//! ```ignore
//! use soobmit_core::{AppSettings, FileSelection, HttpTransport, SimpleUploadCallback, Uploader};
//!
//! let settings = AppSettings::load();
//! let transport = HttpTransport::new(&settings)?;
//! let mut uploader = Uploader::new(transport, &settings);
//! let (callback, mut events) = SimpleUploadCallback::new();
//!
//! // 1. 探测目标
//! uploader.check_reachability("192.168.1.20:3000", &callback).await?;
//!
//! // 2. 选择文件
//! uploader.select_files(FileSelection::from_paths(["a.jpg", "b.pdf"]).await?);
//!
//! // 3. 顺序上传
//! let report = uploader.upload_all(&callback).await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod transfer;
pub mod workflow;

pub use config::AppSettings;
pub use error::{ReachabilityError, SessionError, SettingsError, TransferError};
pub use logging::{LogEntry, LogLevel};

// Transfer re-exports
pub use transfer::{
    FileId, HttpTransport, Scheme, SelectedFile, ServerConfig, ServerEvent, Target, Transport,
    TransportError, UploadServer,
};

// Workflow re-exports
pub use workflow::{
    BatchReport, FileSelection, SessionState, SimpleUploadCallback, UploadCallback, UploadEvent,
    Uploader,
};
