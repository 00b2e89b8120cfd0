use crate::pb::{StreamRequest, StreamResponse};

/// Conversations 调用的应答计数器，每个调用从 1 开始
#[derive(Debug)]
pub struct EchoCorrelator {
    next: u64,
}

impl Default for EchoCorrelator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EchoCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&mut self, request: &StreamRequest) -> StreamResponse {
        let response = StreamResponse {
            answer: format!("Answer: {}, Question: {}", self.next, request.question),
        };
        self.next += 1;
        response
    }
}
