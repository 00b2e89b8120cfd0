use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::Streaming;
use tracing::debug;

use crate::error::GuideError;
use crate::pb::echo_client::EchoClient;
use crate::pb::route_guide_client::RouteGuideClient;
use crate::pb::{Feature, Point, Rectangle, RouteNode, RouteSummary, StreamRequest};

/// 连接参数
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub server_addr: String,
    pub tls: bool,
    pub ca_file: Option<PathBuf>,
    pub server_host_override: Option<String>,
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            server_addr: "localhost:10000".to_string(),
            tls: false,
            ca_file: None,
            server_host_override: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectOptions {
    fn uri(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.server_addr)
    }
}

/// RouteGuide 与 Echo 两个服务共用一条连接的客户端
#[derive(Debug, Clone)]
pub struct GuideClient {
    route_guide: RouteGuideClient<Channel>,
    echo: EchoClient<Channel>,
}

impl GuideClient {
    pub async fn connect(options: &ConnectOptions) -> Result<Self, GuideError> {
        let mut endpoint = Endpoint::from_shared(options.uri())?.timeout(options.timeout);

        if options.tls {
            let mut tls = ClientTlsConfig::new();
            if let Some(ca_file) = &options.ca_file {
                let pem = tokio::fs::read(ca_file).await?;
                tls = tls.ca_certificate(Certificate::from_pem(pem));
            }
            if let Some(domain) = &options.server_host_override {
                tls = tls.domain_name(domain.clone());
            }
            endpoint = endpoint.tls_config(tls)?;
        }

        debug!("Dialing {}", options.uri());
        let channel = endpoint.connect().await?;

        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            route_guide: RouteGuideClient::new(channel.clone()),
            echo: EchoClient::new(channel),
        }
    }

    pub async fn get_feature(&mut self, point: Point) -> Result<Feature, GuideError> {
        Ok(self.route_guide.get_feature(point).await?.into_inner())
    }

    pub async fn list_features(&mut self, rect: Rectangle) -> Result<Streaming<Feature>, GuideError> {
        Ok(self.route_guide.list_features(rect).await?.into_inner())
    }

    pub async fn record_route(&mut self, points: Vec<Point>) -> Result<RouteSummary, GuideError> {
        let summary = self
            .route_guide
            .record_route(tokio_stream::iter(points))
            .await?
            .into_inner();
        Ok(summary)
    }

    pub async fn route_chat(&mut self, notes: Vec<RouteNode>) -> Result<Streaming<RouteNode>, GuideError> {
        Ok(self
            .route_guide
            .route_chat(tokio_stream::iter(notes))
            .await?
            .into_inner())
    }

    /// 一问一答：发出一个问题后等到对应的回答再发下一个
    pub async fn conversations(&mut self, questions: Vec<String>) -> Result<Vec<String>, GuideError> {
        let (tx, rx) = mpsc::channel(1);
        let mut answers = self
            .echo
            .conversations(ReceiverStream::new(rx))
            .await?
            .into_inner();

        let mut received = Vec::with_capacity(questions.len());
        for question in questions {
            if tx.send(StreamRequest { question }).await.is_err() {
                break;
            }
            match answers.message().await? {
                Some(answer) => received.push(answer.answer),
                None => break,
            }
        }

        Ok(received)
    }
}
