use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Router;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{error, info};

use crate::chat::RouteChatHub;
use crate::config::TlsConfig;
use crate::pb::echo_server::EchoServer;
use crate::pb::route_guide_server::RouteGuideServer;
use crate::service::{EchoService, RouteGuideService};
use crate::store::FeatureStore;
use crate::{GuideConfig, Result};

/// gRPC 服务器
///
/// 持有进程级共享状态（要素目录、留言板），每个调用由 tonic 调度到独立的任务上。
pub struct GrpcServer {
    config: GuideConfig,
    features: Option<Arc<FeatureStore>>,
    hub: Arc<RouteChatHub>,
}

impl GrpcServer {
    pub fn new(config: GuideConfig, features: Option<FeatureStore>) -> Self {
        Self {
            config,
            features: features.map(Arc::new),
            hub: Arc::new(RouteChatHub::new()),
        }
    }

    /// 留言板句柄
    pub fn hub(&self) -> Arc<RouteChatHub> {
        Arc::clone(&self.hub)
    }

    /// 监听配置的地址，直到收到 Ctrl-C
    pub async fn start(&self) -> Result<()> {
        let addr = self.resolve_addr().await?;

        info!("RouteGuide server listening on {}", addr);
        info!("Ready to accept calls");

        self.router()?
            .serve_with_shutdown(addr, shutdown_signal())
            .await?;

        info!("RouteGuide server stopped");
        Ok(())
    }

    /// 在已绑定的 listener 上提供服务，`shutdown` 完成后优雅退出
    pub async fn serve_with_incoming<F>(&self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("RouteGuide server listening on {}", addr);
        }

        self.router()?
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        Ok(())
    }

    async fn resolve_addr(&self) -> Result<SocketAddr> {
        let target = format!("{}:{}", self.config.server.host, self.config.server.port);
        let addr = tokio::net::lookup_host(&target)
            .await?
            .next()
            .ok_or_else(|| format!("Could not resolve listen address {}", target))?;
        Ok(addr)
    }

    fn router(&self) -> Result<Router> {
        let server_config = &self.config.server;

        let mut builder =
            Server::builder().concurrency_limit_per_connection(server_config.concurrency_per_connection);

        if server_config.request_timeout > 0 {
            builder = builder.timeout(Duration::from_secs(server_config.request_timeout));
        }

        if server_config.tls.enabled {
            let identity = load_identity(&server_config.tls)?;
            builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
            info!("🔒 TLS enabled");
        }

        let route_guide = RouteGuideService::new(self.features.clone(), Arc::clone(&self.hub));

        Ok(builder
            .add_service(RouteGuideServer::new(route_guide))
            .add_service(EchoServer::new(EchoService)))
    }
}

fn load_identity(tls: &TlsConfig) -> Result<Identity> {
    let cert_file = tls.cert_file.as_ref().ok_or("TLS cert_file is not specified")?;
    let key_file = tls.key_file.as_ref().ok_or("TLS key_file is not specified")?;

    let cert = std::fs::read(cert_file)
        .map_err(|e| format!("Failed to read {}: {}", cert_file.display(), e))?;
    let key = std::fs::read(key_file)
        .map_err(|e| format!("Failed to read {}: {}", key_file.display(), e))?;

    Ok(Identity::from_pem(cert, key))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pb::echo_client::EchoClient;
    use crate::pb::route_guide_client::RouteGuideClient;
    use crate::pb::{Feature, Point, Rectangle, RouteNode, StreamRequest};
    use tokio::net::TcpListener;
    use tokio::sync::{mpsc, oneshot};
    use tokio_stream::wrappers::ReceiverStream;
    use tonic::transport::Channel;
    use tonic::Code;

    struct TestServer {
        addr: SocketAddr,
        hub: Arc<RouteChatHub>,
        shutdown: Option<oneshot::Sender<()>>,
    }

    impl TestServer {
        async fn start(features: Option<FeatureStore>) -> Self {
            Self::start_with_config(GuideConfig::default(), features).await
        }

        async fn start_with_config(config: GuideConfig, features: Option<FeatureStore>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            let server = GrpcServer::new(config, features);
            let hub = server.hub();
            let (tx, rx) = oneshot::channel::<()>();

            tokio::spawn(async move {
                server
                    .serve_with_incoming(listener, async {
                        let _ = rx.await;
                    })
                    .await
                    .unwrap();
            });

            Self {
                addr,
                hub,
                shutdown: Some(tx),
            }
        }

        async fn channel(&self) -> Channel {
            Channel::from_shared(format!("http://{}", self.addr))
                .unwrap()
                .connect()
                .await
                .unwrap()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(tx) = self.shutdown.take() {
                let _ = tx.send(());
            }
        }
    }

    fn bundled_store() -> FeatureStore {
        FeatureStore::load(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/route_guide_db.json")).unwrap()
    }

    #[tokio::test]
    async fn test_get_feature_over_grpc() {
        let server = TestServer::start(Some(bundled_store())).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        let feature = client
            .get_feature(Point::new(409146138, -746188906))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(feature, Feature::unnamed(Point::new(409146138, -746188906)));

        let feature = client
            .get_feature(Point::new(407838351, -746143763))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(feature.name, "Patriots Path, Mendham, NJ 07945, USA");
    }

    #[tokio::test]
    async fn test_list_features_over_grpc() {
        let store = bundled_store();
        let rect = Rectangle::new(
            Point::new(400000000, -750000000),
            Point::new(420000000, -730000000),
        );
        let bounds = crate::geometry::Bounds::from_rectangle(&rect).unwrap();
        let expected: Vec<Feature> = store.range_scan(bounds).cloned().collect();
        assert!(expected.len() < store.len());

        let server = TestServer::start(Some(store)).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        let mut stream = client.list_features(rect).await.unwrap().into_inner();
        let mut received = Vec::new();
        while let Some(feature) = stream.message().await.unwrap() {
            received.push(feature);
        }

        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn test_record_route_over_grpc() {
        let server = TestServer::start(Some(bundled_store())).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        let points = vec![
            Point::new(407838351, -746143763),
            Point::new(100000000, 100000000),
            Point::new(408122808, -743999179),
        ];
        let expected_distance: i32 = points
            .windows(2)
            .map(|w| crate::geometry::distance(&w[0], &w[1]))
            .sum();

        let summary = client
            .record_route(tokio_stream::iter(points))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.feature_count, 2);
        assert_eq!(summary.distance, expected_distance);
        assert!(summary.elapsed_time >= 0);
    }

    #[tokio::test]
    async fn test_slow_record_route_is_not_cut_off() {
        let config = GuideConfig::default();
        assert_eq!(config.server.request_timeout, 0);

        let server = TestServer::start_with_config(config, Some(bundled_store())).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        // 两个点之间间隔 1.5 秒，整个调用持续超过 1 秒
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            tx.send(Point::new(407838351, -746143763)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
            tx.send(Point::new(408122808, -743999179)).await.unwrap();
        });

        let summary = client
            .record_route(ReceiverStream::new(rx))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(summary.point_count, 2);
        assert_eq!(summary.feature_count, 2);
        assert!(summary.elapsed_time >= 1000, "got {}", summary.elapsed_time);
    }

    #[tokio::test]
    async fn test_unimplemented_without_features() {
        let server = TestServer::start(None).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        let status = client.get_feature(Point::new(1, 1)).await.unwrap_err();
        assert_eq!(status.code(), Code::Unimplemented);

        let status = client
            .record_route(tokio_stream::iter(vec![Point::new(1, 1)]))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unimplemented);

        // RouteChat 不依赖要素目录
        let mut replies = client
            .route_chat(tokio_stream::iter(vec![RouteNode::new(Point::new(0, 1), "hi")]))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(replies.message().await.unwrap().unwrap().message, "hi");
    }

    #[tokio::test]
    async fn test_route_chat_demo_script() {
        let server = TestServer::start(None).await;
        let mut client = RouteGuideClient::new(server.channel().await);

        let notes = vec![
            RouteNode::new(Point::new(0, 1), "1st message"),
            RouteNode::new(Point::new(0, 2), "2nd message"),
            RouteNode::new(Point::new(0, 3), "3rd message"),
            RouteNode::new(Point::new(0, 1), "4th message"),
            RouteNode::new(Point::new(0, 2), "5th message"),
            RouteNode::new(Point::new(0, 3), "6th message"),
        ];

        let mut replies = client
            .route_chat(tokio_stream::iter(notes))
            .await
            .unwrap()
            .into_inner();

        let mut received = Vec::new();
        while let Some(note) = replies.message().await.unwrap() {
            received.push(note.message);
        }

        assert_eq!(
            received,
            vec![
                "1st message",
                "2nd message",
                "3rd message",
                "1st message",
                "4th message",
                "2nd message",
                "5th message",
                "3rd message",
                "6th message",
            ]
        );
    }

    /// 逐条发送留言，每发一条就读到以自己这条结尾的快照为止
    async fn chat_in_lockstep(channel: Channel, tag: &'static str, rounds: usize) -> Vec<Vec<String>> {
        let mut client = RouteGuideClient::new(channel);
        let here = Point::new(413628156, -749015468);

        let (tx, rx) = mpsc::channel(4);
        let mut replies = client
            .route_chat(ReceiverStream::new(rx))
            .await
            .unwrap()
            .into_inner();

        let mut snapshots = Vec::new();
        for round in 0..rounds {
            let message = format!("{} {}", tag, round);
            tx.send(RouteNode::new(here, message.clone())).await.unwrap();

            let mut snapshot = Vec::new();
            loop {
                let note = replies.message().await.unwrap().unwrap();
                let done = note.message == message;
                snapshot.push(note.message);
                if done {
                    break;
                }
            }
            snapshots.push(snapshot);
        }

        drop(tx);
        assert!(replies.message().await.unwrap().is_none());
        snapshots
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_route_chat_concurrent_calls_share_location() {
        let server = TestServer::start(None).await;
        let rounds = 10;

        let (a, b) = tokio::join!(
            chat_in_lockstep(server.channel().await, "alice", rounds),
            chat_in_lockstep(server.channel().await, "bob", rounds),
        );

        let history: Vec<String> = server
            .hub
            .notes_at(&Point::new(413628156, -749015468))
            .await
            .iter()
            .map(|note| note.message.clone())
            .collect();
        assert_eq!(history.len(), rounds * 2);

        for snapshot in a.iter().chain(b.iter()) {
            // 每个快照都是完整历史的前缀：不丢、不重、保持追加顺序
            assert_eq!(snapshot.as_slice(), &history[..snapshot.len()]);
        }

        // 同一调用内后一个快照总是更长
        for calls in [&a, &b] {
            for pair in calls.windows(2) {
                assert!(pair[1].len() > pair[0].len());
            }
        }
    }

    #[tokio::test]
    async fn test_conversations_over_grpc() {
        let server = TestServer::start(None).await;
        let channel = server.channel().await;

        for _ in 0..2 {
            let mut client = EchoClient::new(channel.clone());
            let questions = ["q0", "q1", "q2"].map(|q| StreamRequest {
                question: q.to_string(),
            });

            let mut answers = client
                .conversations(tokio_stream::iter(questions))
                .await
                .unwrap()
                .into_inner();

            let mut received = Vec::new();
            while let Some(answer) = answers.message().await.unwrap() {
                received.push(answer.answer);
            }

            // 每个新调用都从 1 开始编号
            assert_eq!(
                received,
                vec![
                    "Answer: 1, Question: q0",
                    "Answer: 2, Question: q1",
                    "Answer: 3, Question: q2",
                ]
            );
        }
    }
}
