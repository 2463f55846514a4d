//! Mock implementations for testing.

use crate::errors::{GatewayError, GatewayResult};
use crate::services::completions::{CompletionRequest, CompletionResponse, CompletionsService};
use async_trait::async_trait;
use mockall::mock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

mock! {
    /// mockall-generated completions service for expectation-style tests
    pub CompletionsApi {}

    #[async_trait]
    impl CompletionsService for CompletionsApi {
        async fn create(&self, request: CompletionRequest) -> GatewayResult<CompletionResponse>;
    }
}

enum ScriptedResponse {
    Ready(GatewayResult<CompletionResponse>),
    Delayed(CompletionResponse, Duration),
}

/// Completions service driven by a queue of scripted responses.
///
/// Each call pops the next entry; an exhausted queue yields an internal
/// error so a test that over-calls fails loudly.
#[derive(Default)]
pub struct ScriptedCompletionsService {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: AtomicU32,
}

impl ScriptedCompletionsService {
    /// Create a service with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn push_ok(&self, response: CompletionResponse) {
        self.responses
            .lock()
            .push_back(ScriptedResponse::Ready(Ok(response)));
    }

    /// Queue an error
    pub fn push_err(&self, error: GatewayError) {
        self.responses
            .lock()
            .push_back(ScriptedResponse::Ready(Err(error)));
    }

    /// Queue a response delivered only after a delay, for timeout tests
    pub fn push_delayed_ok(&self, response: CompletionResponse, delay: Duration) {
        self.responses
            .lock()
            .push_back(ScriptedResponse::Delayed(response, delay));
    }

    /// Number of calls the service has received
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionsService for ScriptedCompletionsService {
    async fn create(&self, _request: CompletionRequest) -> GatewayResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.responses.lock().pop_front();
        match next {
            Some(ScriptedResponse::Ready(result)) => result,
            Some(ScriptedResponse::Delayed(response, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Err(GatewayError::Internal {
                message: "no scripted response queued".to_string(),
            }),
        }
    }
}
