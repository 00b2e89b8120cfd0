use std::path::PathBuf;

use clap::Parser;
use routeguide::server::GrpcServer;
use routeguide::store::FeatureStore;
use routeguide::{GuideConfig, Result};
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "routeguide.toml")]
    config: String,

    /// 生成默认配置文件并退出
    #[arg(long)]
    generate_config: bool,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve over TLS (overrides config file)
    #[arg(long)]
    tls: bool,

    /// TLS certificate file (overrides config file)
    #[arg(long)]
    cert_file: Option<PathBuf>,

    /// TLS key file (overrides config file)
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// JSON or GeoJSON feature catalog (overrides config file)
    #[arg(long)]
    json_db_file: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 生成默认配置文件
    if args.generate_config {
        let config = GuideConfig::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        println!("📝 You can edit this file and restart the server.");
        return Ok(());
    }

    // 加载配置
    let mut config = GuideConfig::from_file(&args.config)?;

    // 命令行参数覆盖配置文件
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.tls {
        config.server.tls.enabled = true;
    }
    if let Some(cert_file) = args.cert_file {
        config.server.tls.cert_file = Some(cert_file);
    }
    if let Some(key_file) = args.key_file {
        config.server.tls.key_file = Some(key_file);
    }
    if let Some(db_file) = args.json_db_file {
        config.features.enabled = true;
        config.features.db_file = db_file;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    // 验证配置
    config.validate()?;

    // 初始化日志系统
    init_logging(&config.logging)?;

    info!("🚀 Starting RouteGuide server...");
    info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    // 打印配置摘要
    config.print_summary();

    // 要素目录加载失败直接退出
    let features = if config.features.enabled {
        match FeatureStore::load(&config.features.db_file) {
            Ok(store) => Some(store),
            Err(e) => {
                error!(
                    "Failed to load features from {}: {}",
                    config.features.db_file.display(),
                    e
                );
                return Err(e.into());
            }
        }
    } else {
        info!("⚠️  Feature catalog disabled - only RouteChat and Echo are served");
        None
    };

    let server = GrpcServer::new(config, features);
    server.start().await?;

    Ok(())
}

/// 初始化日志系统
fn init_logging(config: &routeguide::config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    match (config.output.as_str(), &config.log_file) {
        ("file", Some(log_file)) => {
            // 确保日志目录存在
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(LevelFilter::from_level(level))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(LevelFilter::from_level(level))
                .init();
        }
    }

    Ok(())
}
