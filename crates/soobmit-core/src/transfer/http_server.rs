//! 上传端点服务器
//!
//! 无状态的接收端：每个请求接收一个 multipart 文件，
//! 以 `<时间戳>_<原文件名>` 写入上传目录。
//!
//! # 路由
//!
//! - `GET /ping`    可达性探测
//! - `POST /upload` multipart 字段 `file`
//!
//! 同名文件在同一毫秒内上传会被静默覆盖。

use log::{error, info, warn};

use super::protocol::{ErrorResponse, FILE_FIELD, PING_PATH, PingResponse, UPLOAD_PATH, UploadResponse};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub upload_dir: PathBuf,
    /// 单个请求体上限（字节）
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// 服务器事件
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Pinged,
    Stored {
        original: String,
        stored: String,
        bytes: u64,
    },
    Rejected(String),
}

/// 处理器共享状态
pub struct ServerState {
    upload_dir: PathBuf,
    event_tx: broadcast::Sender<ServerEvent>,
}

/// 上传端点服务器
pub struct UploadServer {
    config: ServerConfig,
    state: Arc<ServerState>,
    local_addr: Option<SocketAddr>,
}

impl UploadServer {
    pub fn new(config: ServerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            state: Arc::new(ServerState {
                upload_dir: config.upload_dir.clone(),
                event_tx,
            }),
            config,
            local_addr: None,
        }
    }

    /// 实际监听的地址（启动后可用）
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// 订阅服务器事件
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.state.event_tx.subscribe()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(PING_PATH, get(ping_handler))
            .route(UPLOAD_PATH, post(upload_handler))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// 准备上传目录并绑定端口
    async fn bind(&mut self) -> io::Result<TcpListener> {
        if !self.config.upload_dir.exists() {
            tokio::fs::create_dir_all(&self.config.upload_dir).await?;
            info!("Created directory: {:?}", self.config.upload_dir);
        }

        let listener = TcpListener::bind(self.config.bind).await?;
        let addr = listener.local_addr()?;
        self.local_addr = Some(addr);
        Ok(listener)
    }

    /// 在后台任务中启动，返回实际监听地址
    pub async fn start(&mut self) -> io::Result<SocketAddr> {
        let listener = self.bind().await?;
        let addr = listener.local_addr()?;
        let app = self.router();

        info!("Upload server listening on {}", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Server error: {}", e);
            }
        });

        Ok(addr)
    }

    /// 在当前任务中运行直到出错
    pub async fn serve(mut self) -> io::Result<()> {
        let listener = self.bind().await?;
        info!("Server running at http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

async fn ping_handler(State(state): State<Arc<ServerState>>) -> Json<PingResponse> {
    info!("Received /ping request");
    let _ = state.event_tx.send(ServerEvent::Pinged);
    Json(PingResponse::reachable())
}

async fn upload_handler(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // 非 multipart 请求同样按“没有文件”回 JSON
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!("Rejected upload request: {}", rejection);
            return reject(&state, "No file uploaded".to_string());
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return reject(&state, e.body_text());
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };

        info!("File upload request for: {}", original);
        let stored = stored_name(&Local::now(), &original);
        info!("Storing file as: {}", stored);

        return match store_field(&state.upload_dir.join(&stored), field).await {
            Ok(bytes) => {
                info!("File uploaded successfully: {} ({} bytes)", stored, bytes);
                let _ = state.event_tx.send(ServerEvent::Stored {
                    original,
                    stored: stored.clone(),
                    bytes,
                });
                (StatusCode::OK, Json(UploadResponse::stored(stored))).into_response()
            }
            Err(e) => {
                error!("Failed to store {}: {}", stored, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Failed to store file")),
                )
                    .into_response()
            }
        };
    }

    error!("No file was uploaded");
    reject(&state, "No file uploaded".to_string())
}

fn reject(state: &ServerState, reason: String) -> Response {
    let _ = state.event_tx.send(ServerEvent::Rejected(reason.clone()));
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response()
}

/// 把字段内容逐块写入磁盘，失败时删除半成品
async fn store_field(path: &Path, mut field: Field<'_>) -> io::Result<u64> {
    let result: io::Result<u64> = async {
        let mut out = File::create(path).await?;
        let mut bytes: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(io::Error::other)? {
            out.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }

        out.flush().await?;
        Ok(bytes)
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

/// 生成落盘文件名：`YYYYMMDD-HHMMSSmmm_<原文件名>`
///
/// 原文件名只保留最后一个路径分量。
pub fn stored_name<Tz>(now: &DateTime<Tz>, original: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("upload");

    format!("{}_{}", now.format("%Y%m%d-%H%M%S%3f"), base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 14, 7, 5).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_stored_name_prefixes_timestamp() {
        assert_eq!(
            stored_name(&fixed_time(), "holiday.jpg"),
            "20250309-140705042_holiday.jpg"
        );
    }

    #[test]
    fn test_stored_name_strips_directories() {
        assert_eq!(
            stored_name(&fixed_time(), "../../etc/passwd"),
            "20250309-140705042_passwd"
        );
        assert_eq!(
            stored_name(&fixed_time(), "C:\\Users\\me\\notes.txt"),
            "20250309-140705042_notes.txt"
        );
    }

    #[test]
    fn test_stored_name_falls_back_for_empty() {
        assert_eq!(stored_name(&fixed_time(), "dir/"), "20250309-140705042_upload");
        assert_eq!(stored_name(&fixed_time(), ".."), "20250309-140705042_upload");
    }

    #[tokio::test]
    async fn test_start_creates_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("nested").join("uploads");

        let mut server = UploadServer::new(ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            upload_dir: upload_dir.clone(),
            ..Default::default()
        });
        let addr = server.start().await.unwrap();

        assert!(upload_dir.is_dir());
        assert_ne!(addr.port(), 0);
        assert_eq!(server.local_addr(), Some(addr));
    }
}
