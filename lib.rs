pub mod chat;
pub mod client;
pub mod config;
pub mod echo;
pub mod error;
pub mod geometry;
pub mod pb;
pub mod route;
pub mod server;
pub mod service;
pub mod store;

use std::error::Error;

// 重新导出主要的公共接口
pub use chat::RouteChatHub;
pub use config::GuideConfig;
pub use echo::EchoCorrelator;
pub use error::GuideError;
pub use route::RouteAggregator;
pub use store::FeatureStore;

// 重新导出常用类型，便于二进制文件使用
pub use client::{CliArgs, GuideClient, OutputFormatter};
pub use server::GrpcServer;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
