//! Soobmit TUI - 交互式终端界面
//!
//! 使用 ratatui 输入目标、挑选文件并实时显示上传进度。
//!
//! # 日志
//!
//! 日志默认显示在 TUI 的"日志"标签页中。
//! 如需输出到文件进行调试，设置 RUST_LOG 环境变量：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p soobmit-tui 2>> /tmp/soobmit.log
//! ```

mod app;
mod file_selector;
mod tui_log;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use soobmit_core::AppSettings;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, AppMode, Tab};
use tui_log::TuiLogLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // 可选参数：文件选择器的起始目录
    let start_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    let app = App::new(AppSettings::load(), start_dir)?;

    // 初始化日志系统，发送到 TUI 日志面板
    init_logging(app.event_tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// 初始化日志系统
///
/// - 总是将日志发送到 TUI 日志面板
/// - 如果设置了 RUST_LOG，同时输出到 stderr（用于调试）
fn init_logging(log_tx: tokio::sync::mpsc::Sender<app::AppEvent>) {
    // 桥接 log crate（soobmit-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let tui_layer = TuiLogLayer::new(log_tx);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,soobmit_core=debug"));

    if std::env::var("RUST_LOG").is_ok() {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .with(stderr_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .try_init();
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // 使用 poll 避免无限阻塞，同时让出运行时给后台上传任务
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.mode {
                AppMode::TargetInput => match key.code {
                    KeyCode::Enter => app.submit_target(),
                    KeyCode::Esc => app.mode = AppMode::Normal,
                    KeyCode::Char(c) => app.input_buffer.push(c),
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
                AppMode::FileSelection => match key.code {
                    KeyCode::Esc => app.mode = AppMode::Normal,
                    KeyCode::Up | KeyCode::Char('k') => app.file_selector.previous(),
                    KeyCode::Down | KeyCode::Char('j') => app.file_selector.next(),
                    KeyCode::Char(' ') => app.file_selector.toggle(),
                    KeyCode::Char('a') => app.add_marked_files(),
                    KeyCode::Enter => {
                        if let Err(e) = app.file_selector.enter() {
                            tracing::warn!("Cannot open directory: {}", e);
                        }
                    }
                    KeyCode::Backspace | KeyCode::Left => {
                        if let Err(e) = app.file_selector.parent() {
                            tracing::warn!("Cannot open parent directory: {}", e);
                        }
                    }
                    _ => {}
                },
                AppMode::Normal => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('e') => app.edit_target(),
                    KeyCode::Char('a') => app.open_file_selector(),
                    KeyCode::Char('x') | KeyCode::Delete => app.deselect_current(),
                    KeyCode::Char('u') => app.start_upload(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                    KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                    KeyCode::Tab => app.next_tab(),
                    KeyCode::Char('1') => app.tab = Tab::Upload,
                    KeyCode::Char('2') => app.tab = Tab::Log,
                    KeyCode::Char('d') => app.toggle_log_level(),
                    KeyCode::Char('c') => app.clear_logs(),
                    _ => {}
                },
            }
        }

        // Update app state (handle async events)
        app.tick();
    }
}
