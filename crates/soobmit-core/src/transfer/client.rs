//! HTTP/HTTPS 上传客户端
//!
//! # 功能
//!
//! - `GET /ping` 可达性探测（带超时）
//! - `POST /upload` 以 multipart 流式上传单个文件，并按块回报进度
//!
//! 进度是当前文件的百分比 `round(sent / total * 100)`，
//! 每读出一个块就计算一次，百分比变化时才回调。

use log::{debug, info, warn};

use super::protocol::{ErrorResponse, FILE_FIELD, PING_PATH, PingResponse, UPLOAD_PATH, UploadResponse};
use super::{SelectedFile, Target, TransportError};
use crate::config::AppSettings;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

/// 单文件进度回调，参数为 0..=100 的百分比
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u8) + Send);

/// 编排器与网络之间的接缝
#[async_trait]
pub trait Transport: Send + Sync {
    /// 可达性探测
    async fn ping(&self, target: &Target) -> Result<PingResponse, TransportError>;

    /// 上传单个文件
    async fn upload(
        &self,
        target: &Target,
        file: &SelectedFile,
        on_progress: ProgressFn<'_>,
    ) -> Result<UploadResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn ping(&self, target: &Target) -> Result<PingResponse, TransportError> {
        (**self).ping(target).await
    }

    async fn upload(
        &self,
        target: &Target,
        file: &SelectedFile,
        on_progress: ProgressFn<'_>,
    ) -> Result<UploadResponse, TransportError> {
        (**self).upload(target, file, on_progress).await
    }
}

/// 基于 reqwest 的传输实现
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    ping_timeout: Duration,
    upload_timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(settings: &AppSettings) -> Result<Self, TransportError> {
        if settings.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            ping_timeout: settings.ping_timeout(),
            upload_timeout: settings.upload_timeout(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn ping(&self, target: &Target) -> Result<PingResponse, TransportError> {
        let url = target.endpoint(PING_PATH);
        debug!("Pinging {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.ping_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .json::<PingResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        debug!("Ping answered: {}", body.message);
        Ok(body)
    }

    async fn upload(
        &self,
        target: &Target,
        file: &SelectedFile,
        on_progress: ProgressFn<'_>,
    ) -> Result<UploadResponse, TransportError> {
        let url = target.endpoint(UPLOAD_PATH);
        info!("Uploading {} ({} bytes) to {}", file.name, file.size, url);

        let handle = File::open(&file.path).await?;
        let total = file.size;

        // 请求体每被读出一个块就把长度发回来
        let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel::<usize>();
        let body_stream = ReaderStream::new(handle).inspect_ok(move |chunk| {
            let _ = chunk_tx.send(chunk.len());
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body_stream), total)
            .file_name(file.name.clone());
        let form = Form::new().part(FILE_FIELD, part);

        let mut request = self.client.post(&url).multipart(form);
        if let Some(timeout) = self.upload_timeout {
            request = request.timeout(timeout);
        }

        let mut meter = ProgressMeter::new(total);
        let send = request.send();
        tokio::pin!(send);

        let response = loop {
            tokio::select! {
                result = &mut send => break result?,
                Some(len) = chunk_rx.recv() => {
                    if let Some(percent) = meter.advance(len as u64) {
                        on_progress(percent);
                    }
                }
            }
        };

        while let Ok(len) = chunk_rx.try_recv() {
            if let Some(percent) = meter.advance(len as u64) {
                on_progress(percent);
            }
        }

        let status = response.status();
        if status == StatusCode::OK {
            let body = response
                .json::<UploadResponse>()
                .await
                .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
            info!("Stored {} as {}", file.name, body.filename);
            return Ok(body);
        }

        if status == StatusCode::BAD_REQUEST
            && let Ok(body) = response.json::<ErrorResponse>().await
        {
            return Err(TransportError::Rejected(body.error));
        }

        Err(TransportError::Status(status.as_u16()))
    }
}

/// 把已发送字节数换算为百分比，只在百分比变化时产出
struct ProgressMeter {
    sent: u64,
    total: u64,
    last: Option<u8>,
}

impl ProgressMeter {
    fn new(total: u64) -> Self {
        Self {
            sent: 0,
            total,
            last: None,
        }
    }

    fn advance(&mut self, bytes: u64) -> Option<u8> {
        // 空文件没有可报告的进度
        if self.total == 0 {
            return None;
        }

        self.sent = self.sent.saturating_add(bytes);
        let percent = ((self.sent.min(self.total) as u128 * 100 + self.total as u128 / 2)
            / self.total as u128) as u8;

        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }
}
