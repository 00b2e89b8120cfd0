use tokio_stream::StreamExt;
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

use crate::echo::EchoCorrelator;
use crate::pb::echo_server::Echo;
use crate::pb::{StreamRequest, StreamResponse};

use super::ResponseStream;

/// Echo 服务：按收到的顺序逐条应答，编号每个调用从 1 开始
#[derive(Debug, Default, Clone)]
pub struct EchoService;

#[tonic::async_trait]
impl Echo for EchoService {
    type ConversationsStream = ResponseStream<StreamResponse>;

    async fn conversations(
        &self,
        request: Request<Streaming<StreamRequest>>,
    ) -> Result<Response<Self::ConversationsStream>, Status> {
        let mut correlator = EchoCorrelator::new();

        let answers = request.into_inner().map(move |received| {
            received.map(|question| {
                debug!("Stream client question: {}", question.question);
                correlator.answer(&question)
            })
        });

        Ok(Response::new(Box::pin(answers)))
    }
}
