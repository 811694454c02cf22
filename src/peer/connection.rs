use crate::config::Config;
use crate::error::NegotiationError;
use crate::logger::{dump_candidate, dump_selected_pair};
use crate::peer::data_channel::{attach_dc, ChannelSlot};
use crate::peer::engine::NegotiationEngine;
use crate::peer::events::{EventSink, PeerEvent};
use crate::peer::types::{IceServerConfig, SessionDescription};
use crate::utils::add_ice_url_scheme;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::rtcp_mux_policy::RTCRtcpMuxPolicy;
use webrtc::{
    api::APIBuilder,
    data_channel::{data_channel_init::RTCDataChannelInit, RTCDataChannel},
    ice_transport::ice_server::RTCIceServer,
    peer_connection::{
        configuration::RTCConfiguration, peer_connection_state::RTCPeerConnectionState,
        RTCPeerConnection,
    },
};

/// Движок на webrtc-rs. Держит одно соединение на попытку рукопожатия.
pub struct RtcEngine {
    config: Config,
    events: EventSink,
    peer: Mutex<Option<Arc<RTCPeerConnection>>>,
    channel: ChannelSlot,
}

impl RtcEngine {
    pub fn new(config: Config, events: EventSink) -> Self {
        Self {
            config,
            events,
            peer: Mutex::new(None),
            channel: Arc::new(Mutex::new(None)),
        }
    }

    /// создаём Peer; если `initiator`, то сами делаем data-channel
    async fn new_peer(&self, initiator: bool) -> Result<Arc<RTCPeerConnection>, NegotiationError> {
        let api = APIBuilder::new().build();
        let pc = Arc::new(
            api.new_peer_connection(rtc_config(&self.config.ice_servers))
                .await?,
        );

        pc.on_ice_candidate(Box::new(|cand: Option<RTCIceCandidate>| {
            match cand {
                Some(c) => dump_candidate("LOCAL", &c),
                // cand == None означает конец сбора
                None => debug!("ICE candidate gathering completed (null candidate received)"),
            }
            Box::pin(async {})
        }));

        pc.on_ice_gathering_state_change(Box::new(|state| {
            debug!("ICE gathering state changed to: {:?}", state);
            Box::pin(async {})
        }));

        // события этого соединения; после close() они уже не доходят
        let scoped = self.events.next_generation();

        // слабая ссылка, иначе обработчик держит соединение вечно
        let pc_stats = Arc::downgrade(&pc);
        let events = scoped.clone();
        pc.on_peer_connection_state_change(Box::new(move |st: RTCPeerConnectionState| {
            info!("Peer connection state changed to: {:?}", st);

            match st {
                RTCPeerConnectionState::Connected => events.emit(PeerEvent::Connected),
                RTCPeerConnectionState::Disconnected => {
                    warn!("Peer connection disconnected, it may still recover");
                }
                RTCPeerConnectionState::Failed => {
                    if let Some(pc) = pc_stats.upgrade() {
                        tokio::spawn(async move {
                            dump_selected_pair(&pc, "BEFORE-FAIL").await;
                        });
                    }
                    events.emit(PeerEvent::Failed);
                }
                RTCPeerConnectionState::Closed => events.emit(PeerEvent::Disconnected),
                _ => {}
            }
            Box::pin(async {})
        }));

        let greeting = self.config.greeting.clone();
        if initiator {
            let dc = pc
                .create_data_channel(
                    &self.config.data_channel_label,
                    Some(RTCDataChannelInit::default()),
                )
                .await?;
            attach_dc(&dc, greeting, &scoped);
            *self.channel.lock().await = Some(dc);
        } else {
            let slot = Arc::clone(&self.channel);
            let events = scoped;
            pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                info!("Remote opened data channel '{}'", dc.label());
                attach_dc(&dc, greeting.clone(), &events);
                let slot = Arc::clone(&slot);
                Box::pin(async move {
                    *slot.lock().await = Some(dc);
                })
            }));
        }

        *self.peer.lock().await = Some(Arc::clone(&pc));
        Ok(pc)
    }

    /// Ждём конца сбора ICE, но не дольше gather_timeout
    async fn wait_for_gathering(&self, gather_complete: &mut mpsc::Receiver<()>) {
        let limit = self.config.gather_timeout;
        if timeout(limit, gather_complete.recv()).await.is_err() {
            warn!(
                "ICE gathering did not finish in {} s, using candidates gathered so far",
                limit.as_secs()
            );
        }
    }

    async fn final_local_description(
        &self,
        pc: &RTCPeerConnection,
    ) -> Result<SessionDescription, NegotiationError> {
        let local = pc
            .local_description()
            .await
            .ok_or(NegotiationError::NoLocalDescription)?;
        SessionDescription::try_from(local)
    }

    /// текст по каналу
    pub async fn send_text(&self, text: String) -> Result<(), NegotiationError> {
        let dc = { self.channel.lock().await.as_ref().cloned() };
        let dc = dc.ok_or(NegotiationError::NoDataChannel)?;
        let n = dc.send_text(text).await?;
        debug!("Sent {} bytes over '{}'", n, dc.label());
        Ok(())
    }

    /// ручное разъединение
    pub async fn close(&self) {
        // старое соединение замолкает до того, как начнёт закрываться
        self.events.next_generation();

        let dc = self.channel.lock().await.take();
        if let Some(dc) = dc {
            if let Err(e) = dc.close().await {
                debug!("Closing data channel: {}", e);
            }
        }

        let pc = self.peer.lock().await.take();
        if let Some(pc) = pc {
            info!("Closing previous peer connection");
            if let Err(e) = pc.close().await {
                debug!("Closing peer connection: {}", e);
            }
        }
    }
}

#[async_trait]
impl NegotiationEngine for RtcEngine {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        self.close().await;
        let pc = self.new_peer(true).await?;

        debug!("Creating offer...");
        let offer = pc.create_offer(None).await?;

        // подписываемся до set_local_description, чтобы не пропустить конец сбора
        let mut gather_complete = pc.gathering_complete_promise().await;
        debug!("Setting local description (offer)...");
        pc.set_local_description(offer).await?;

        self.wait_for_gathering(&mut gather_complete).await;
        self.final_local_description(&pc).await
    }

    async fn apply_answer(&self, answer: SessionDescription) -> Result<(), NegotiationError> {
        let pc = { self.peer.lock().await.as_ref().cloned() };
        let pc = pc.ok_or(NegotiationError::NoPendingOffer)?;

        debug!("Setting remote description (answer)...");
        pc.set_remote_description(answer.into_rtc()?).await?;
        info!("Remote description set, waiting for the data channel");
        Ok(())
    }

    async fn create_answer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        self.close().await;
        let pc = self.new_peer(false).await?;

        debug!("Setting remote description (offer)...");
        pc.set_remote_description(offer.into_rtc()?).await?;

        debug!("Creating answer...");
        let answer = pc.create_answer(None).await?;

        let mut gather_complete = pc.gathering_complete_promise().await;
        debug!("Setting local description (answer)...");
        pc.set_local_description(answer).await?;

        self.wait_for_gathering(&mut gather_complete).await;
        self.final_local_description(&pc).await
    }
}

/// Создает конфигурацию для peer connection
fn rtc_config(servers: &[IceServerConfig]) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: ice_servers(servers),
        bundle_policy: RTCBundlePolicy::MaxBundle,
        rtcp_mux_policy: RTCRtcpMuxPolicy::Require,
        ..Default::default()
    }
}

pub fn ice_servers(servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    servers
        .iter()
        .map(|config| RTCIceServer {
            urls: vec![add_ice_url_scheme(config)],
            username: config.username.clone().unwrap_or_default(),
            credential: config.credential.clone().unwrap_or_default(),
        })
        .collect()
}
