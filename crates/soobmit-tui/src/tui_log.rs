//! TUI 日志层
//!
//! tracing Layer，把事件转发到日志标签页。终端处于 raw mode，
//! 不能直接写 stderr。

use crate::app::AppEvent;
use std::fmt::{self, Write};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

pub struct TuiLogLayer {
    tx: mpsc::Sender<AppEvent>,
}

impl TuiLogLayer {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let message = visitor.finish(event.metadata().target());
        // 面板满了就丢弃，不阻塞调用方
        let _ = self.tx.try_send(AppEvent::LogMessage {
            level: event.metadata().level().to_string(),
            message,
        });
    }
}

/// 收集 `message` 和其余字段，其余字段以 `key=value` 追加
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: String,
}

impl FieldCollector {
    fn finish(self, target: &str) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (true, true) => target.to_string(),
            (true, false) => self.fields,
            (false, true) => self.message,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if !field.name().starts_with("log.") {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else if !field.name().starts_with("log.") {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }
}
