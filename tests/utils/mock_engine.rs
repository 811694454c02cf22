use async_trait::async_trait;
use manual_signaling_lib::peer::{NegotiationEngine, SessionDescription};
use manual_signaling_lib::NegotiationError;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const OFFER_SDP: &str = "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\na=group:BUNDLE 0\r\n";
pub const ANSWER_SDP: &str = "v=0\r\no=- 3 4 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\na=group:BUNDLE 0\r\n";

/// Вызов, дошедший до движка
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    CreateOffer,
    ApplyAnswer(SessionDescription),
    CreateAnswer(SessionDescription),
}

/// Mock NegotiationEngine, который записывает все вызовы и умеет отказывать.
#[derive(Clone, Default)]
pub struct MockEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    reject_with: Option<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Движок, который отклоняет любой запрос
    pub fn rejecting(reason: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reject_with: Some(reason.to_string()),
        }
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: EngineCall) -> Result<(), NegotiationError> {
        tracing::debug!("[MockEngine] {:?}", call);
        self.calls.lock().await.push(call);
        match &self.reject_with {
            Some(reason) => Err(NegotiationError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NegotiationEngine for MockEngine {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        self.record(EngineCall::CreateOffer).await?;
        Ok(SessionDescription::offer(OFFER_SDP))
    }

    async fn apply_answer(&self, answer: SessionDescription) -> Result<(), NegotiationError> {
        self.record(EngineCall::ApplyAnswer(answer)).await
    }

    async fn create_answer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        self.record(EngineCall::CreateAnswer(offer)).await?;
        Ok(SessionDescription::answer(ANSWER_SDP))
    }
}
