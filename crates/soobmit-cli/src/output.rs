//! 终端输出 - 把编排器事件打印出来

use soobmit_core::{BatchReport, LogLevel, SessionState, UploadEvent};
use std::io::Write;
use tokio::sync::mpsc;

/// 消费事件直到发送端全部关闭
pub async fn print_events(mut rx: mpsc::Receiver<UploadEvent>) {
    let mut progress_line = false;

    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::State(state) => {
                end_line(&mut progress_line);
                if let Some(text) = describe_state(state) {
                    println!("{}", text);
                }
            }
            UploadEvent::Progress {
                file_name,
                percent,
                overall,
                ..
            } => {
                print!("\r   {} {:>3}% │ 总进度 {:>3}%", file_name, percent, overall);
                let _ = std::io::stdout().flush();
                progress_line = true;
            }
            UploadEvent::Status(message) => {
                end_line(&mut progress_line);
                println!("   💬 {}", message);
            }
            UploadEvent::Notice(notice) => {
                end_line(&mut progress_line);
                if notice.level <= LogLevel::Warn {
                    eprintln!("{}", notice);
                } else {
                    println!("{}", notice);
                }
            }
            UploadEvent::FileFinished {
                file_name,
                stored_as,
                ..
            } => {
                end_line(&mut progress_line);
                match stored_as {
                    Some(stored) => println!("   ✅ {} → {}", file_name, stored),
                    None => println!("   ❌ {}", file_name),
                }
            }
            UploadEvent::BatchComplete(report) => {
                end_line(&mut progress_line);
                print_report(&report);
            }
        }
    }

    end_line(&mut progress_line);
}

fn end_line(progress_line: &mut bool) {
    if *progress_line {
        println!();
        *progress_line = false;
    }
}

fn describe_state(state: SessionState) -> Option<&'static str> {
    match state {
        SessionState::Start => None,
        SessionState::CheckingReachability => Some("🔍 检查目标是否可达..."),
        SessionState::Uploading => Some("📤 目标可达，准备上传"),
        SessionState::Success => Some("🎉 上传完成"),
        SessionState::Failure => Some("💥 上传失败"),
    }
}

fn print_report(report: &BatchReport) {
    println!("📦 总进度: {}%", report.overall);
    if !report.uploaded.is_empty() {
        println!("已上传:");
        for name in &report.uploaded {
            println!("   • {}", name);
        }
    }
    if !report.failed.is_empty() {
        println!("失败:");
        for failed in &report.failed {
            println!("   • {} ({})", failed.name, failed.reason);
        }
    }
}
