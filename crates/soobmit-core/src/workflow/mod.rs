//! 工作流模块
//!
//! 提供高层 API 封装完整的探测/选择/上传流程

pub mod progress;
pub mod selection;
pub mod uploader;

pub use progress::{BatchProgress, STATUS_MESSAGES, StatusRotator};
pub use selection::FileSelection;
pub use uploader::{
    BatchReport, FailedFile, SessionState, SimpleUploadCallback, UploadCallback, UploadEvent,
    Uploader,
};
