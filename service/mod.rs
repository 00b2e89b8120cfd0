pub mod echo;
pub mod route_guide;

use std::pin::Pin;

use tokio_stream::Stream;
use tonic::Status;

pub use echo::EchoService;
pub use route_guide::{chat_session, RouteGuideService};

/// 服务端流式响应
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;
