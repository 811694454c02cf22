use crate::error::NegotiationError;
use crate::peer::types::SessionDescription;
use async_trait::async_trait;

/// Движок согласования, который стоит за адаптером.
/// Адаптер знает только эти вызовы, внутренности соединения ему не видны.
#[async_trait]
pub trait NegotiationEngine: Send + Sync {
    /// Инициатор: новое соединение, локальный offer, ожидание сбора ICE.
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;

    /// Инициатор: применить answer к ожидающему соединению.
    async fn apply_answer(&self, answer: SessionDescription) -> Result<(), NegotiationError>;

    /// Отвечающая сторона: принять offer и вернуть готовый answer.
    async fn create_answer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError>;
}
