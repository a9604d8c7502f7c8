//! Soobmit Server
//!
//! 上传端点，负责：
//! - `GET /ping` 可达性探测
//! - `POST /upload` 接收单个 multipart 文件并以时间戳命名落盘

use anyhow::Result;
use clap::Parser;
use soobmit_core::{ServerConfig, ServerEvent, UploadServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soobmit-server", version, about = "Soobmit 上传端点")]
struct Args {
    /// 监听地址
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
    /// 上传文件保存目录
    #[arg(short, long, default_value = "uploads")]
    upload_dir: PathBuf,
    /// 单个请求体上限 (MiB)
    #[arg(long, default_value = "1024")]
    max_upload_mb: usize,
    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 桥接 log crate（soobmit-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();
    init_logging(args.json_logs);

    tracing::info!("Soobmit server starting...");

    let mut server = UploadServer::new(ServerConfig {
        bind: args.bind,
        upload_dir: args.upload_dir,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    });
    let events = server.subscribe();
    let addr = server.start().await?;
    tracing::info!("Server running at http://{}", addr);

    let event_handle = tokio::spawn(log_events(events));

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutting down");
        }
        res = event_handle => {
            tracing::error!("Event logger exited: {:?}", res);
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,soobmit_core=debug,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// 汇总上传统计
async fn log_events(mut events: tokio::sync::broadcast::Receiver<ServerEvent>) {
    let mut stored_count: u64 = 0;
    let mut stored_bytes: u64 = 0;

    loop {
        match events.recv().await {
            Ok(ServerEvent::Stored {
                original,
                stored,
                bytes,
            }) => {
                stored_count += 1;
                stored_bytes += bytes;
                tracing::info!(
                    %original,
                    %stored,
                    bytes,
                    total_files = stored_count,
                    total_bytes = stored_bytes,
                    "file stored"
                );
            }
            Ok(ServerEvent::Rejected(reason)) => {
                tracing::warn!(%reason, "upload rejected");
            }
            Ok(ServerEvent::Pinged) => {}
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!("Event logger lagged, {} events missed", missed);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
