use contracts::dashboards::d402_receipt_analytics::ReceiptChangeEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Capacity of the broadcast buffer per subscriber
const HUB_CAPACITY: usize = 256;

pub type ChangeCallback = Box<dyn Fn(ReceiptChangeEvent) + Send + Sync + 'static>;

/// Push subscription to row changes of the receipts table
pub trait ReceiptChangeFeed: Send + Sync {
    /// Invoke `callback` for every change event, in arrival order, until the
    /// returned subscription is dropped.
    fn subscribe(&self, callback: ChangeCallback) -> ReceiptSubscription;
}

/// Fan-out of change events to any number of subscribers
#[derive(Clone)]
pub struct ReceiptChangeHub {
    sender: broadcast::Sender<ReceiptChangeEvent>,
}

impl Default for ReceiptChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Returns how many subscribers got the event
    pub fn publish(&self, event: ReceiptChangeEvent) -> usize {
        // send only fails when nobody listens
        self.sender.send(event).unwrap_or(0)
    }

    pub fn receiver(&self) -> broadcast::Receiver<ReceiptChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ReceiptChangeFeed for ReceiptChangeHub {
    fn subscribe(&self, callback: ChangeCallback) -> ReceiptSubscription {
        let mut receiver = self.receiver();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => callback(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Receipt subscriber lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        ReceiptSubscription { handle }
    }
}

/// Active subscription; delivery stops when it is dropped
pub struct ReceiptSubscription {
    handle: JoinHandle<()>,
}

impl ReceiptSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for ReceiptSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
