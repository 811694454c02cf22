use crate::error::{HandshakeError, NegotiationError};
use crate::peer::engine::NegotiationEngine;
use crate::peer::token::{self, TokenFormat};
use crate::peer::types::{SdpType, SessionDescription};
use crate::utils::random_id;
use tracing::{error, info};

/// Где сейчас находится рукопожатие
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    Idle,
    /// offer выдан, ждём answer от второй стороны
    AwaitingAnswer,
    /// мы отвечающая сторона и answer уже отдан
    Answered,
    Established,
    /// попытка провалена, нужен новый begin_offer / accept_offer
    Failed,
}

/// Адаптер ручного сигналинга поверх движка согласования.
/// Методы берут `&mut self`, так что одновременно идёт не больше одного вызова.
pub struct SignalingAdapter<E> {
    engine: E,
    format: TokenFormat,
    phase: HandshakePhase,
    attempt: String,
}

impl<E: NegotiationEngine> SignalingAdapter<E> {
    pub fn new(engine: E, format: TokenFormat) -> Self {
        Self {
            engine,
            format,
            phase: HandshakePhase::Idle,
            attempt: random_id(),
        }
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// A-сторона: новый offer. Предыдущая попытка, если была, выбрасывается.
    pub async fn begin_offer(&mut self) -> Result<SessionDescription, HandshakeError> {
        self.attempt = random_id();
        info!(attempt = %self.attempt, "begin_offer: creating offer");

        match self.engine.create_offer().await {
            Ok(offer) => {
                info!(attempt = %self.attempt, sdp_len = offer.sdp.len(), "Offer ready");
                self.phase = HandshakePhase::AwaitingAnswer;
                Ok(offer)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// То же, что begin_offer, но сразу в виде токена для копирования
    pub async fn offer_token(&mut self) -> Result<String, HandshakeError> {
        let offer = self.begin_offer().await?;
        token::encode(&offer, self.format).map_err(|e| self.fail(e.into()))
    }

    /// A-сторона: получает ANSWER и завершает handshake
    pub async fn apply_answer(&mut self, encoded: &str) -> Result<(), HandshakeError> {
        info!(attempt = %self.attempt, token_len = encoded.len(), "apply_answer called");

        // токен разбираем до любого обращения к движку
        let answer = match token::decode_expecting(encoded, SdpType::Answer) {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(e.into())),
        };

        if self.phase != HandshakePhase::AwaitingAnswer {
            return Err(self.fail(NegotiationError::NoPendingOffer.into()));
        }

        match self.engine.apply_answer(answer).await {
            Ok(()) => {
                info!(attempt = %self.attempt, "Answer applied, handshake complete");
                self.phase = HandshakePhase::Established;
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// B-сторона: получает OFFER, делает ANSWER → токен
    pub async fn accept_offer(&mut self, encoded: &str) -> Result<String, HandshakeError> {
        self.attempt = random_id();
        info!(attempt = %self.attempt, token_len = encoded.len(), "accept_offer called");

        let offer = match token::decode_expecting(encoded, SdpType::Offer) {
            Ok(offer) => offer,
            Err(e) => return Err(self.fail(e.into())),
        };

        let answer = match self.engine.create_answer(offer).await {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(e.into())),
        };

        let encoded = token::encode(&answer, self.format).map_err(|e| self.fail(e.into()))?;
        info!(attempt = %self.attempt, token_len = encoded.len(), "Answer ready");
        self.phase = HandshakePhase::Answered;
        Ok(encoded)
    }

    /// Любая ошибка фатальна для попытки: один раз пишем в лог и отдаём наверх
    fn fail(&mut self, e: HandshakeError) -> HandshakeError {
        error!(attempt = %self.attempt, "Handshake failed: {}", e);
        self.phase = HandshakePhase::Failed;
        e
    }
}
