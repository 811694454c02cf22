use crate::peer::types::SdpType;
use thiserror::Error;

/// Вставленный токен не удалось разобрать
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compressed token could not be inflated: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("compressed token inflates past {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("token does not hold a session description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session description has an empty sdp field")]
    EmptySdp,

    #[error("expected an {expected} token, got an {found}")]
    UnexpectedType { expected: SdpType, found: SdpType },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("session description could not be serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session description could not be compressed: {0}")]
    Deflate(#[from] std::io::Error),
}

/// Движок отказался создать offer или применить answer
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("webrtc engine error: {0}")]
    Engine(#[from] webrtc::Error),

    #[error("no offer is pending, start a new handshake first")]
    NoPendingOffer,

    #[error("peer connection has no local description")]
    NoLocalDescription,

    #[error("unsupported session description type: {0}")]
    UnsupportedType(String),

    #[error("no data channel is open")]
    NoDataChannel,

    #[error("engine rejected the request: {0}")]
    Rejected(String),
}

/// Единственный тип ошибки, который отдаёт адаптер
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
}
