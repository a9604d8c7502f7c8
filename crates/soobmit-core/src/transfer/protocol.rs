//! 端点的 JSON 响应格式
//!
//! - `GET /ping`    → 200 `{"message": ...}`
//! - `POST /upload` → 200 `{"message": ..., "filename": ...}`
//! - `POST /upload` 缺少 `file` 字段 → 400 `{"error": ...}`

use serde::{Deserialize, Serialize};

pub const PING_PATH: &str = "/ping";
pub const UPLOAD_PATH: &str = "/upload";
/// multipart 表单中承载文件的字段名
pub const FILE_FIELD: &str = "file";

/// `/ping` 成功响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

impl PingResponse {
    pub fn reachable() -> Self {
        Self {
            message: "Server is reachable".to_string(),
        }
    }
}

/// `/upload` 成功响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// 服务端实际保存的文件名
    pub filename: String,
}

impl UploadResponse {
    pub fn stored(filename: impl Into<String>) -> Self {
        Self {
            message: "File uploaded successfully!".to_string(),
            filename: filename.into(),
        }
    }
}

/// 失败响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
