//! UI rendering module

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use soobmit_core::{LogLevel, SessionState};

use crate::app::{App, AppMode, Tab};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.tab {
        Tab::Upload => draw_upload_tab(frame, app, chunks[1]),
        Tab::Log => draw_log_tab(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);

    if app.mode == AppMode::FileSelection {
        draw_file_selector(frame, app, centered(frame.area(), 70, 70));
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let selected = match app.tab {
        Tab::Upload => 0,
        Tab::Log => 1,
    };

    let tabs = Tabs::new(vec!["上传 [1]", "日志 [2]"])
        .block(Block::default().borders(Borders::ALL).title(" Soobmit "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    frame.render_widget(tabs, area);
}

fn draw_upload_tab(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Target
            Constraint::Min(5),    // Selection / uploaded
            Constraint::Length(3), // Current file
            Constraint::Length(3), // Overall
            Constraint::Length(3), // Status message
        ])
        .split(area);

    draw_target(frame, app, chunks[0]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    draw_selection(frame, app, lists[0]);
    draw_uploaded(frame, app, lists[1]);

    draw_gauges(frame, app, chunks[2], chunks[3]);

    let status = Paragraph::new(app.status_message.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" 💬 状态 "));
    frame.render_widget(status, chunks[4]);
}

fn draw_target(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.mode == AppMode::TargetInput {
        (
            format!("{}▏", app.input_buffer),
            Style::default().fg(Color::Yellow),
        )
    } else if app.session == SessionState::CheckingReachability {
        (
            format!("{}  🔍 检查中...", app.input_buffer),
            Style::default().fg(Color::Blue),
        )
    } else if let Some(target) = app.target_label() {
        (format!("✅ {}", target), Style::default().fg(Color::Green))
    } else {
        (app.input_buffer.clone(), Style::default())
    };

    let input = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(" 🎯 目标地址 "),
    );
    frame.render_widget(input, area);
}

fn draw_selection(frame: &mut Frame, app: &App, area: Rect) {
    let files = app.selected_files();
    let total: u64 = files.iter().map(|f| f.size).sum();

    let items: Vec<ListItem> = files
        .iter()
        .map(|file| {
            let percent = app.file_progress.get(&file.id).copied().unwrap_or(0);
            let marker = if app.current_file == Some(file.id) {
                "▶"
            } else if percent == 100 {
                "✔"
            } else {
                " "
            };
            ListItem::new(format!(
                "{} {} ({}) {:>3}%",
                marker,
                file.name,
                format_size(file.size),
                percent
            ))
        })
        .collect();

    let title = format!(" 📁 待上传 {} 个 / {} ", files.len(), format_size(total));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !files.is_empty() && !app.is_busy() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_uploaded(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .uploaded
        .iter()
        .map(|name| ListItem::new(format!("✅ {}", name)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 📦 已上传 {} ", app.uploaded.len())),
    );
    frame.render_widget(list, area);
}

fn draw_gauges(frame: &mut Frame, app: &App, file_area: Rect, overall_area: Rect) {
    let current = app
        .current_file
        .and_then(|id| app.selected_files().iter().find(|f| f.id == id));
    let (file_title, file_percent) = match current {
        Some(file) => (
            format!(" 📄 {} ", file.name),
            app.file_progress.get(&file.id).copied().unwrap_or(0),
        ),
        None => (" 📄 当前文件 ".to_string(), 0),
    };

    let file_gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(file_title))
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::Black))
        .percent(u16::from(file_percent))
        .label(format!("{}%", file_percent));
    frame.render_widget(file_gauge, file_area);

    let overall_color = match app.session {
        SessionState::Failure => Color::Red,
        _ => Color::Green,
    };
    let overall_gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" 📦 总进度 "))
        .gauge_style(Style::default().fg(overall_color).bg(Color::Black))
        .percent(u16::from(app.overall))
        .label(format!("{}%", app.overall));
    frame.render_widget(overall_gauge, overall_area);
}

fn draw_log_tab(frame: &mut Frame, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .visible_logs()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .take(height)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => Color::Red,
                LogLevel::Warn => Color::Yellow,
                LogLevel::Info => Color::White,
                LogLevel::Debug | LogLevel::Trace => Color::DarkGray,
            };
            ListItem::new(entry.to_string()).style(Style::default().fg(color))
        })
        .collect();

    let title = format!(
        " 📋 日志 (≤ {}) [d]级别 [c]清空 ",
        app.min_log_level.name()
    );
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_file_selector(frame: &mut Frame, app: &App, area: Rect) {
    let selector = &app.file_selector;
    let items: Vec<ListItem> = selector
        .entries
        .iter()
        .map(|entry| {
            let text = if entry.is_dir {
                format!("   📁 {}/", entry.name)
            } else {
                let mark = if selector.is_marked(&entry.path) {
                    "[x]"
                } else {
                    "[ ]"
                };
                format!("{} 📄 {} ({})", mark, entry.name, format_size(entry.size))
            };
            ListItem::new(text)
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} ", selector.current_dir.display())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !selector.entries.is_empty() {
        state.select(Some(selector.cursor));
    }

    let help = Paragraph::new(format!(
        "已标记 {} │ [Space]标记 [Enter]打开 [Backspace]上级 [a]添加 [Esc]取消",
        selector.marked_count()
    ))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, chunks[0], &mut state);
    frame.render_widget(help, chunks[1]);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_text = match app.session {
        SessionState::Start => " ⏸️  未连接 ",
        SessionState::CheckingReachability => " 🔍 检查中 ",
        SessionState::Uploading if app.is_busy() => " 🔄 上传中 ",
        SessionState::Uploading => " 📤 可上传 ",
        SessionState::Success => " 🎉 完成 ",
        SessionState::Failure => " 💥 失败 ",
    };

    let keys = match app.mode {
        AppMode::TargetInput => "[Enter]检查 [Esc]返回",
        AppMode::FileSelection => "[a]添加 [Esc]取消",
        AppMode::Normal => "[a]选择文件 [x]移除 [u]上传 [e]目标 [Tab]切换 [q]退出",
    };

    let line = match &app.notice {
        Some(notice) => format!("{}│ {} │ {}", mode_text, notice, keys),
        None => format!("{}│ {}", mode_text, keys),
    };

    let style = match app.notice.as_ref().map(|n| n.level) {
        Some(LogLevel::Error) => Style::default().fg(Color::Red),
        Some(LogLevel::Warn) => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };

    let status = Paragraph::new(line)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
