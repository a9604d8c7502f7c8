//! 错误类型
//!
//! 编排器只区分两类失败：目标不可达、单个文件传输失败。
//! 网络层原因（DNS、拒绝连接、超时、非 200 响应）统一归入这两类，
//! 底层错误只作为 `source` 保留给日志。

use crate::transfer::TransportError;
use thiserror::Error;

/// 可达性探测失败
#[derive(Debug, Error)]
pub enum ReachabilityError {
    #[error("no target given")]
    EmptyTarget,

    #[error("{target} is not reachable")]
    Unreachable {
        target: String,
        #[source]
        source: TransportError,
    },
}

/// 单个文件传输失败
#[derive(Debug, Error)]
#[error("upload of {file} failed")]
pub struct TransferError {
    pub file: String,
    #[source]
    pub source: TransportError,
}

/// 当前会话状态不允许执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("target has not been confirmed reachable")]
    NotReachable,

    #[error("no files selected")]
    EmptySelection,
}

/// 设置读写失败
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}
