use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::GuideError;

/// RouteGuide 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideConfig {
    /// 服务器配置
    pub server: ServerConfig,

    /// 要素目录配置
    pub features: FeaturesConfig,

    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 单次调用超时时间（秒），默认 0 表示不限制
    ///
    /// 超时覆盖整个处理过程：RecordRoute 要等客户端流结束才返回，
    /// 设置后路线持续时间也受这个限制
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// 每个连接上的并发调用数上限
    #[serde(default = "default_concurrency_per_connection")]
    pub concurrency_per_connection: usize,

    /// TLS 配置
    #[serde(default)]
    pub tls: TlsConfig,
}

/// TLS 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// 是否启用 TLS
    #[serde(default)]
    pub enabled: bool,

    /// PEM 证书文件
    pub cert_file: Option<PathBuf>,

    /// PEM 私钥文件
    pub key_file: Option<PathBuf>,
}

/// 要素目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// 是否加载要素目录，关闭时依赖目录的调用返回 Unimplemented
    #[serde(default = "default_features_enabled")]
    pub enabled: bool,

    /// JSON 库或 GeoJSON 文件
    #[serde(default = "default_db_file")]
    pub db_file: PathBuf,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_request_timeout() -> u64 {
    0
}

fn default_concurrency_per_connection() -> usize {
    32
}

fn default_features_enabled() -> bool {
    true
}

fn default_db_file() -> PathBuf {
    PathBuf::from("./testdata/route_guide_db.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout: default_request_timeout(),
                concurrency_per_connection: default_concurrency_per_connection(),
                tls: TlsConfig::default(),
            },
            features: FeaturesConfig {
                enabled: default_features_enabled(),
                db_file: default_db_file(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                output: default_log_output(),
                log_file: None,
            },
        }
    }
}

impl GuideConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（ROUTEGUIDE__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use routeguide::config::GuideConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = GuideConfig::from_file("routeguide.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> Result<Self, GuideError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ROUTEGUIDE").separator("__"))
            .build()
            .map_err(|e| GuideError::Config(format!("Failed to load config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| GuideError::Config(format!("Failed to parse config: {}", e)))
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &str) -> Result<(), GuideError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| GuideError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置
    ///
    /// 检查配置的合法性，包括：
    /// - 端口范围
    /// - TLS 证书与私钥
    /// - 日志级别与日志文件
    pub fn validate(&self) -> Result<(), GuideError> {
        // 验证端口（非特权端口）
        if self.server.port < 1024 {
            return Err(GuideError::Config(format!(
                "Server port {} is below 1024 (privileged range)",
                self.server.port
            )));
        }

        if self.server.concurrency_per_connection == 0 {
            return Err(GuideError::Config(
                "concurrency_per_connection must be greater than 0".to_string(),
            ));
        }

        // 启用 TLS 时证书和私钥都必须存在
        if self.server.tls.enabled {
            for (what, file) in [
                ("cert_file", &self.server.tls.cert_file),
                ("key_file", &self.server.tls.key_file),
            ] {
                match file {
                    None => {
                        return Err(GuideError::Config(format!(
                            "TLS is enabled but {} is not specified",
                            what
                        )))
                    }
                    Some(path) if !path.exists() => {
                        return Err(GuideError::Config(format!(
                            "TLS {} '{}' does not exist",
                            what,
                            path.display()
                        )))
                    }
                    Some(_) => {}
                }
            }
        }

        // 验证日志级别
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(GuideError::Config(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志文件配置
        if self.logging.output == "file" && self.logging.log_file.is_none() {
            return Err(GuideError::Config(
                "Log output is 'file' but log_file path is not specified".to_string(),
            ));
        }

        Ok(())
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("📋 RouteGuide Configuration:");
        println!("   Server:      {}:{}", self.server.host, self.server.port);
        println!(
            "   Timeout:     {}",
            if self.server.request_timeout == 0 {
                "none".to_string()
            } else {
                format!("{} seconds", self.server.request_timeout)
            }
        );
        println!(
            "   Concurrency: {} calls per connection",
            self.server.concurrency_per_connection
        );
        println!(
            "   TLS:         {}",
            if self.server.tls.enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
        if let Some(ref cert_file) = self.server.tls.cert_file {
            println!("   Cert File:   {}", cert_file.display());
        }
        println!();
        if self.features.enabled {
            println!("   Features:    {}", self.features.db_file.display());
        } else {
            println!("   Features:    disabled");
        }
        println!();
        println!("   Log Level:   {}", self.logging.level);
        println!("   Log Output:  {}", self.logging.output);
        if let Some(ref log_file) = self.logging.log_file {
            println!("   Log File:    {}", log_file.display());
        }
        println!();
    }
}
