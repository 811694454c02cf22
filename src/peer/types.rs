use crate::error::NegotiationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use webrtc::peer_connection::sdp::{
    sdp_type::RTCSdpType, session_description::RTCSessionDescription,
};

/// Тип SDP, который переносит токен
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    // wasm-сборка пишет тип через `{:?}`, отсюда заглавные варианты
    #[serde(alias = "Offer")]
    Offer,
    #[serde(alias = "Answer")]
    Answer,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpType::Offer => f.write_str("offer"),
            SdpType::Answer => f.write_str("answer"),
        }
    }
}

impl TryFrom<RTCSdpType> for SdpType {
    type Error = NegotiationError;

    fn try_from(t: RTCSdpType) -> Result<Self, Self::Error> {
        match t {
            RTCSdpType::Offer => Ok(SdpType::Offer),
            RTCSdpType::Answer => Ok(SdpType::Answer),
            other => Err(NegotiationError::UnsupportedType(other.to_string())),
        }
    }
}

/// Описание сессии, которое гоняем между пирами руками
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp: String,
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            sdp_type: SdpType::Offer,
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            sdp_type: SdpType::Answer,
        }
    }

    /// Перевод в тип webrtc-rs; SDP при этом парсится, кривой текст даст ошибку движка
    pub fn into_rtc(self) -> Result<RTCSessionDescription, NegotiationError> {
        let desc = match self.sdp_type {
            SdpType::Offer => RTCSessionDescription::offer(self.sdp)?,
            SdpType::Answer => RTCSessionDescription::answer(self.sdp)?,
        };
        Ok(desc)
    }
}

impl TryFrom<RTCSessionDescription> for SessionDescription {
    type Error = NegotiationError;

    fn try_from(desc: RTCSessionDescription) -> Result<Self, Self::Error> {
        Ok(Self {
            sdp_type: SdpType::try_from(desc.sdp_type)?,
            sdp: desc.sdp,
        })
    }
}

/// Вид ICE сервера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    Stun,
    Turn,
}

/// Конфигурация ICE сервера
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServerConfig {
    pub kind: ServerKind,
    pub url: String,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            kind: ServerKind::Stun,
            url: url.into(),
            username: None,
            credential: None,
        }
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            kind: ServerKind::Turn,
            url: url.into(),
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }
}
