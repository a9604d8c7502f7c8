//! 文件传输模块
//!
//! 包含:
//! - 目标地址解析
//! - 端点 JSON 协议
//! - HTTP/HTTPS 客户端 (上传端)
//! - HTTP 服务器 (接收端点)

pub mod client;
pub mod http_server;
pub mod protocol;
pub mod target;

pub use client::{HttpTransport, ProgressFn, Transport};
pub use http_server::{ServerConfig, ServerEvent, UploadServer};
pub use protocol::{ErrorResponse, PingResponse, UploadResponse};
pub use target::{Scheme, Target};

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// 选中文件的稳定标识
///
/// 同一批次里可能出现同名文件，进度按 id 而不是文件名记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub id: FileId,
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            id: FileId::new(),
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    /// 读取文件元数据构造
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self::new(path, name, metadata.len()))
    }
}

/// 传输层错误
///
/// 编排器不区分这些原因，只在日志中保留。
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("rejected by target: {0}")]
    Rejected(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_selected_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        tokio::fs::write(&path, vec![0u8; 1234]).await.unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size, 1234);
        assert_eq!(file.path, path);
    }

    #[tokio::test]
    async fn test_selected_file_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_same_name_gets_distinct_ids() {
        let a = SelectedFile::new("/tmp/a/notes.txt", "notes.txt", 1);
        let b = SelectedFile::new("/tmp/b/notes.txt", "notes.txt", 1);
        assert_ne!(a.id, b.id);
    }
}
