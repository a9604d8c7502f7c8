//! 应用配置和持久化
//!
//! 提供默认协议、超时、状态文案轮换阈值等设置的存储和读取。

use crate::error::SettingsError;
use crate::transfer::Scheme;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 目标未写明协议时使用的协议
    pub default_scheme: Scheme,
    /// 上一次成功探测的目标（用于预填输入框）
    pub last_target: Option<String>,
    /// 可达性探测超时（秒）
    pub ping_timeout_secs: u64,
    /// 单个文件上传超时（秒），`None` 表示不限
    pub upload_timeout_secs: Option<u64>,
    /// 是否接受自签名证书
    pub accept_invalid_certs: bool,
    /// 总进度前进多少个百分点后轮换状态文案
    pub rotation_step_percent: u8,
    /// 距上次轮换多少毫秒后轮换状态文案
    pub rotation_interval_ms: u64,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_scheme: Scheme::Https,
            last_target: None,
            ping_timeout_secs: 5,
            upload_timeout_secs: None,
            accept_invalid_certs: false,
            rotation_step_percent: 5,
            rotation_interval_ms: 3000,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("soobmit");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match Self::from_toml(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Option<Duration> {
        self.upload_timeout_secs.map(Duration::from_secs)
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_scheme, Scheme::Https);
        assert_eq!(settings.rotation_step_percent, 5);
        assert_eq!(settings.rotation_interval(), Duration::from_millis(3000));
        assert!(!settings.accept_invalid_certs);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = AppSettings::from_toml(
            r#"
            default_scheme = "http"
            ping_timeout_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.default_scheme, Scheme::Http);
        assert_eq!(settings.ping_timeout(), Duration::from_secs(2));
        assert_eq!(settings.rotation_step_percent, 5);
        assert!(settings.upload_timeout().is_none());
    }

    #[test]
    fn test_toml_roundtrip_keeps_target() {
        let settings = AppSettings {
            last_target: Some("192.168.1.20:3000".to_string()),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = AppSettings::from_toml(&text).unwrap();
        assert_eq!(parsed.last_target.as_deref(), Some("192.168.1.20:3000"));
    }
}
