use crate::peer::events::{EventSink, PeerEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::RTCDataChannel;

/// Текущий канал соединения; отвечающая сторона заполняет его из on_data_channel
pub type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// общий обработчик data-channel
pub fn attach_dc(dc: &Arc<RTCDataChannel>, greeting: Option<String>, events: &EventSink) {
    debug!("attach_dc called for '{}'", dc.label());

    // приветствие уходит, как только канал открыт
    dc.on_open(Box::new({
        let dc = Arc::clone(dc);
        let events = events.clone();
        move || {
            let label = dc.label().to_owned();
            info!("Data channel '{}' open", label);
            events.emit(PeerEvent::ChannelOpen { label });
            Box::pin(async move {
                if let Some(text) = greeting {
                    match dc.send_text(text).await {
                        Ok(n) => debug!("Sent greeting, {} bytes", n),
                        Err(e) => warn!("Failed to send greeting: {}", e),
                    }
                }
            })
        }
    }));

    dc.on_message(Box::new({
        let events = events.clone();
        move |msg: DataChannelMessage| {
            debug!("Received message, length: {}", msg.data.len());
            let text = String::from_utf8_lossy(&msg.data).into_owned();
            events.emit(PeerEvent::Message(text));
            Box::pin(async {})
        }
    }));

    dc.on_close(Box::new({
        let events = events.clone();
        let label = dc.label().to_owned();
        move || {
            info!("Data channel '{}' closed", label);
            events.emit(PeerEvent::ChannelClosed {
                label: label.clone(),
            });
            Box::pin(async {})
        }
    }));
}
