//! 上传目标地址

use crate::error::ReachabilityError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 访问目标时使用的协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(format!("unsupported scheme: {}", other)),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用户输入的目标
///
/// 除非空以外不做任何校验；主机部分原样拼进 URL。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    host: String,
}

impl Target {
    /// 解析用户输入
    ///
    /// 输入可以带 `http://` / `https://` 前缀，否则使用 `default_scheme`。
    pub fn parse(input: &str, default_scheme: Scheme) -> Result<Self, ReachabilityError> {
        let input = input.trim();

        let (scheme, rest) = match input.split_once("://") {
            Some((prefix, rest)) => match prefix.parse::<Scheme>() {
                Ok(scheme) => (scheme, rest),
                Err(_) => (default_scheme, input),
            },
            None => (default_scheme, input),
        };

        let host = rest.trim_end_matches('/');
        if host.is_empty() {
            return Err(ReachabilityError::EmptyTarget);
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// 拼接某个端点的完整 URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}://{}/{}",
            self.scheme,
            self.host,
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}
