use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// То, что пир сообщает наружу (раньше это были события UI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Connected,
    Disconnected,
    Failed,
    ChannelOpen { label: String },
    ChannelClosed { label: String },
    Message(String),
}

pub type EventReceiver = mpsc::UnboundedReceiver<PeerEvent>;

/// Отправитель событий. У каждого соединения своё поколение:
/// события от соединения старого поколения до получателя не доходят.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<PeerEvent>,
    current: Arc<AtomicU64>,
    generation: u64,
}

impl EventSink {
    pub fn new() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            current: Arc::new(AtomicU64::new(0)),
            generation: 0,
        };
        (sink, rx)
    }

    /// Открывает новое поколение; все ранее выданные отправители замолкают
    pub fn next_generation(&self) -> EventSink {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            tx: self.tx.clone(),
            current: Arc::clone(&self.current),
            generation,
        }
    }

    pub fn emit(&self, event: PeerEvent) {
        if self.current.load(Ordering::SeqCst) != self.generation {
            debug!("drop {:?} from retired connection #{}", event, self.generation);
            return;
        }
        debug!("emit {:?}", event);
        // получатель мог уже уйти, событие тогда просто теряется
        let _ = self.tx.send(event);
    }
}
