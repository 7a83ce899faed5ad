//! Shared probe for category pipeline tests.

use lightbox_model::ChangeEvent;
use lightbox_triage::ChangeObserver;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Observer that forwards every delivered event into a test channel.
pub struct EventProbe {
    observer: Arc<ForwardingObserver>,
    rx: Receiver<ChangeEvent>,
}

struct ForwardingObserver {
    tx: Mutex<Sender<ChangeEvent>>,
}

impl ChangeObserver for ForwardingObserver {
    fn on_change(&self, event: &ChangeEvent) {
        let tx = self.tx.lock().expect("probe channel lock poisoned");
        let _ = tx.send(event.clone());
    }
}

impl EventProbe {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            observer: Arc::new(ForwardingObserver { tx: Mutex::new(tx) }),
            rx,
        }
    }

    pub fn observer(&self) -> Arc<dyn ChangeObserver> {
        Arc::clone(&self.observer) as Arc<dyn ChangeObserver>
    }

    /// The next delivered event, waiting up to the delivery timeout.
    pub fn next(&self) -> ChangeEvent {
        self.rx
            .recv_timeout(DELIVERY_TIMEOUT)
            .expect("change event delivered in time")
    }

    /// Every event delivered so far, without waiting for more.
    pub fn drained(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }
}
