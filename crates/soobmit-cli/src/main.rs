//! Soobmit CLI
//!
//! 命令行客户端：探测目标并把文件顺序上传过去

mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use soobmit_core::{
    AppSettings, FileSelection, HttpTransport, Scheme, SimpleUploadCallback, Uploader,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soobmit", version, about = "把文件上传到任意目标主机")]
struct Cli {
    /// 目标未写明协议时使用的协议 (http / https)
    #[arg(long, global = true)]
    scheme: Option<Scheme>,
    /// 接受自签名证书
    #[arg(short = 'k', long, global = true)]
    insecure: bool,
    /// 可达性探测超时 (秒)
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查目标是否可达
    Ping {
        /// 目标地址 (默认: 上一次成功的目标)
        target: Option<String>,
    },
    /// 上传文件
    Upload {
        /// 目标地址，例如 192.168.1.20:3000 或 http://nas.local:3000
        target: String,
        /// 要上传的文件
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = AppSettings::load();
    if let Some(scheme) = cli.scheme {
        settings.default_scheme = scheme;
    }
    if let Some(timeout) = cli.timeout {
        settings.ping_timeout_secs = timeout;
    }
    settings.accept_invalid_certs |= cli.insecure;
    settings.verbose |= cli.verbose;

    init_logging(settings.verbose);

    let transport = HttpTransport::new(&settings)?;
    let mut uploader = Uploader::new(transport, &settings);
    let (callback, events) = SimpleUploadCallback::new();
    let printer = tokio::spawn(output::print_events(events));

    let result = match cli.command {
        Commands::Ping { target } => {
            let target = target
                .or_else(|| settings.last_target.clone())
                .context("没有指定目标，也没有上一次成功的目标")?;
            println!("🔍 探测: {}", target);
            ping(&mut uploader, &callback, &target).await
        }
        Commands::Upload { target, files } => {
            println!("📤 上传 {} 个文件到 {}", files.len(), target);
            upload(&mut uploader, &callback, &target, files).await
        }
    };

    // 关闭 channel 让打印任务退出
    drop(callback);
    let _ = printer.await;

    if let Some(target) = result? {
        settings.last_target = Some(target);
        if let Err(e) = settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    Ok(())
}

/// 返回成功探测的目标，用于记住上一次的目标
async fn ping(
    uploader: &mut Uploader<HttpTransport>,
    callback: &SimpleUploadCallback,
    target: &str,
) -> Result<Option<String>> {
    uploader.check_reachability(target, callback).await?;
    println!("✅ {} 可达", target);
    Ok(Some(target.to_string()))
}

async fn upload(
    uploader: &mut Uploader<HttpTransport>,
    callback: &SimpleUploadCallback,
    target: &str,
    files: Vec<PathBuf>,
) -> Result<Option<String>> {
    let selection = FileSelection::from_paths(&files)
        .await
        .context("无法读取待上传文件")?;

    uploader.check_reachability(target, callback).await?;
    uploader.select_files(selection);

    let report = uploader.upload_all(callback).await?;
    if report.uploaded.is_empty() {
        bail!("{} 个文件全部上传失败", report.failed.len());
    }

    Ok(Some(target.to_string()))
}

fn init_logging(verbose: bool) {
    // 桥接 log crate（soobmit-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let default = if verbose {
        "info,soobmit_core=debug"
    } else {
        "warn"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .try_init();
}
