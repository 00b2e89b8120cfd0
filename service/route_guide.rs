use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

use crate::chat::RouteChatHub;
use crate::error::GuideError;
use crate::geometry::Bounds;
use crate::pb::route_guide_server::RouteGuide;
use crate::pb::{Feature, Point, Rectangle, RouteNode, RouteSummary};
use crate::route::RouteAggregator;
use crate::store::FeatureStore;

use super::ResponseStream;

/// RouteChat 每个调用的出站缓冲，满了之后发送方等待（背压）
const CHAT_BUFFER: usize = 32;

/// RouteGuide 服务
///
/// 要素目录和留言板在所有调用之间共享；没有加载要素目录时，
/// 依赖目录的三个调用返回 `Unimplemented`。
#[derive(Debug, Clone)]
pub struct RouteGuideService {
    features: Option<Arc<FeatureStore>>,
    hub: Arc<RouteChatHub>,
}

impl RouteGuideService {
    pub fn new(features: Option<Arc<FeatureStore>>, hub: Arc<RouteChatHub>) -> Self {
        Self { features, hub }
    }

    fn features(&self) -> Result<&Arc<FeatureStore>, Status> {
        self.features
            .as_ref()
            .ok_or_else(|| Status::unimplemented("no feature database loaded"))
    }
}

#[tonic::async_trait]
impl RouteGuide for RouteGuideService {
    async fn get_feature(&self, request: Request<Point>) -> Result<Response<Feature>, Status> {
        let store = self.features()?;
        let point = request.into_inner();

        let feature = store.lookup(&point);
        debug!(
            "GetFeature ({}, {}) -> {:?}",
            point.latitude, point.longitude, feature.name
        );

        Ok(Response::new(feature))
    }

    type ListFeaturesStream = ResponseStream<Feature>;

    async fn list_features(
        &self,
        request: Request<Rectangle>,
    ) -> Result<Response<Self::ListFeaturesStream>, Status> {
        let store = self.features()?;
        let rect = request.into_inner();
        let bounds = Bounds::from_rectangle(&rect).ok_or(GuideError::MissingField("rectangle corner"))?;

        debug!("ListFeatures within {:?} .. {:?}", bounds.min(), bounds.max());

        let features = tokio_stream::iter(store.scan(bounds).map(Ok::<_, Status>));
        Ok(Response::new(Box::pin(features)))
    }

    async fn record_route(
        &self,
        request: Request<Streaming<Point>>,
    ) -> Result<Response<RouteSummary>, Status> {
        let store = Arc::clone(self.features()?);
        let mut points = request.into_inner();

        let mut route = RouteAggregator::new(&store);
        while let Some(point) = points.message().await? {
            route.record(point);
        }

        let summary = route.finish();
        info!(
            "RecordRoute: {} points, {} features, {} m in {} ms",
            summary.point_count, summary.feature_count, summary.distance, summary.elapsed_time
        );

        Ok(Response::new(summary))
    }

    type RouteChatStream = ResponseStream<RouteNode>;

    async fn route_chat(
        &self,
        request: Request<Streaming<RouteNode>>,
    ) -> Result<Response<Self::RouteChatStream>, Status> {
        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(CHAT_BUFFER);

        tokio::spawn(chat_session(Arc::clone(&self.hub), inbound, tx));

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}

/// 单个 RouteChat 调用的收-写-发循环
///
/// 每收到一条留言就写入留言板，然后把该位置的快照按顺序发回对端。
/// 发送时不持有留言板的锁。对端断开（出站通道关闭）时直接结束；
/// 入站出错时把错误转发给对端后结束。已写入的留言不会因为发送失败而回滚。
pub async fn chat_session<S>(
    hub: Arc<RouteChatHub>,
    mut inbound: S,
    outbound: mpsc::Sender<Result<RouteNode, Status>>,
) where
    S: Stream<Item = Result<RouteNode, Status>> + Unpin,
{
    while let Some(received) = inbound.next().await {
        let snapshot = match received.map_err(GuideError::from) {
            Ok(note) => hub.post(note).await,
            Err(err) => Err(err),
        };

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("RouteChat ended: {}", err);
                // 对端可能已经不在了，忽略发送结果
                let _ = outbound.send(Err(err.into())).await;
                return;
            }
        };

        for note in snapshot {
            if outbound.send(Ok(RouteNode::clone(&note))).await.is_err() {
                debug!("RouteChat peer went away");
                return;
            }
        }
    }

    debug!("RouteChat inbound closed");
}
