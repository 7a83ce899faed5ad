//! Asynchronous change-event fan-out.

use lightbox_model::ChangeEvent;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::error;

/// Handler for category change events. Observers are typically UI panels;
/// they run on the distributor's worker thread, one at a time.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

const EVENT_QUEUE_CAPACITY: usize = 1024;

type ObserverList = Arc<Mutex<Vec<Arc<dyn ChangeObserver>>>>;

/// Order-preserving publish/subscribe channel with one consumer thread.
///
/// `post` never blocks the mutating caller; the worker dequeues in post
/// order and delivers to each registered observer serially. An observer
/// that panics is logged and skipped, never crashing the worker or
/// stopping delivery to the remaining observers.
pub struct EventDistributor {
    tx: SyncSender<ChangeEvent>,
    observers: ObserverList,
    worker: JoinHandle<()>,
}

/// Cloneable posting handle for the mutating side.
#[derive(Clone)]
pub struct EventPoster {
    tx: SyncSender<ChangeEvent>,
}

impl EventDistributor {
    /// Spawn the worker and return the distributor handle.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        let observers: ObserverList = Arc::new(Mutex::new(Vec::new()));
        let worker_observers = Arc::clone(&observers);
        let worker = thread::spawn(move || run_dispatch_loop(rx, worker_observers));
        Self {
            tx,
            observers,
            worker,
        }
    }

    /// A posting handle that can outlive borrows of the distributor.
    pub fn poster(&self) -> EventPoster {
        EventPoster {
            tx: self.tx.clone(),
        }
    }

    /// Enqueue an event for delivery; returns immediately.
    pub fn post(&self, event: ChangeEvent) {
        post_event(&self.tx, event);
    }

    /// Register an observer. Registering the same observer again delivers
    /// every event once per registration.
    pub fn register(&self, observer: Arc<dyn ChangeObserver>) {
        self.lock_observers().push(observer);
    }

    /// Remove every registration of the observer. Unregistering an
    /// observer that was never registered is a no-op.
    pub fn unregister(&self, observer: &Arc<dyn ChangeObserver>) {
        self.lock_observers()
            .retain(|existing| !same_observer(existing, observer));
    }

    /// Drain queued events and stop the worker.
    ///
    /// Blocks until every [`EventPoster`] clone has been dropped and the
    /// queue is empty; drop posters before calling this.
    pub fn shutdown(self) {
        let EventDistributor {
            tx,
            observers: _,
            worker,
        } = self;
        drop(tx);
        if worker.join().is_err() {
            error!("Category event worker exited abnormally");
        }
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn ChangeObserver>>> {
        self.observers.lock().expect("Observer list lock poisoned")
    }
}

impl EventPoster {
    /// Enqueue an event for delivery; returns immediately.
    pub fn post(&self, event: ChangeEvent) {
        post_event(&self.tx, event);
    }
}

fn post_event(tx: &SyncSender<ChangeEvent>, event: ChangeEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        // An observer stalled deep enough to fill the queue; dropping is
        // the documented backpressure policy for this layer.
        Err(TrySendError::Full(event)) => {
            error!(
                "Category event queue full; dropping event for {} item(s)",
                event.items().len()
            );
        }
        Err(TrySendError::Disconnected(_)) => {
            error!("Category event worker is gone; dropping event");
        }
    }
}

fn run_dispatch_loop(rx: Receiver<ChangeEvent>, observers: ObserverList) {
    while let Ok(event) = rx.recv() {
        let snapshot: Vec<Arc<dyn ChangeObserver>> = observers
            .lock()
            .expect("Observer list lock poisoned")
            .clone();
        for observer in snapshot {
            let delivery = panic::catch_unwind(AssertUnwindSafe(|| observer.on_change(&event)));
            if delivery.is_err() {
                error!("Category change observer panicked; continuing delivery");
            }
        }
    }
}

fn same_observer(a: &Arc<dyn ChangeObserver>, b: &Arc<dyn ChangeObserver>) -> bool {
    // Compare data addresses only; vtable pointers are not stable enough
    // to mean anything here.
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_model::{ItemId, TagId};
    use std::sync::mpsc::Sender;
    use std::time::Duration;

    /// Forwards every delivered event into a test channel.
    struct ChannelObserver {
        tx: Mutex<Sender<ChangeEvent>>,
    }

    impl ChannelObserver {
        fn pair() -> (Arc<dyn ChangeObserver>, mpsc::Receiver<ChangeEvent>) {
            let (tx, rx) = mpsc::channel();
            (
                Arc::new(ChannelObserver { tx: Mutex::new(tx) }),
                rx,
            )
        }
    }

    impl ChangeObserver for ChannelObserver {
        fn on_change(&self, event: &ChangeEvent) {
            let tx = self.tx.lock().expect("test channel lock");
            let _ = tx.send(event.clone());
        }
    }

    struct PanickyObserver;

    impl ChangeObserver for PanickyObserver {
        fn on_change(&self, _event: &ChangeEvent) {
            panic!("observer failure");
        }
    }

    fn recv(rx: &mpsc::Receiver<ChangeEvent>) -> ChangeEvent {
        rx.recv_timeout(Duration::from_secs(5))
            .expect("event delivered in time")
    }

    #[test]
    fn test_delivers_in_post_order() {
        let distributor = EventDistributor::start();
        let (observer, rx) = ChannelObserver::pair();
        distributor.register(observer);

        for raw in 1..=5 {
            distributor.post(ChangeEvent::for_item(
                ItemId::new(raw),
                Some(TagId::new(101)),
            ));
        }

        for raw in 1..=5 {
            let event = recv(&rx);
            assert!(event.items().contains(&ItemId::new(raw)));
        }
        distributor.shutdown();
    }

    #[test]
    fn test_panicking_observer_does_not_stop_delivery() {
        let distributor = EventDistributor::start();
        let (observer, rx) = ChannelObserver::pair();
        // Panicky observer registered first, so it runs before the
        // channel observer on every event.
        distributor.register(Arc::new(PanickyObserver));
        distributor.register(observer);

        distributor.post(ChangeEvent::for_item(ItemId::new(1), None));
        distributor.post(ChangeEvent::for_item(ItemId::new(2), None));

        assert!(recv(&rx).items().contains(&ItemId::new(1)));
        assert!(recv(&rx).items().contains(&ItemId::new(2)));
        distributor.shutdown();
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let distributor = EventDistributor::start();
        let (observer, rx) = ChannelObserver::pair();
        distributor.register(Arc::clone(&observer));

        distributor.post(ChangeEvent::for_item(ItemId::new(1), None));
        assert!(recv(&rx).items().contains(&ItemId::new(1)));

        distributor.unregister(&observer);
        distributor.post(ChangeEvent::for_item(ItemId::new(2), None));
        distributor.shutdown();

        assert!(
            rx.try_recv().is_err(),
            "no delivery after unregister, even once the queue drains"
        );
    }

    #[test]
    fn test_unregister_unknown_observer_is_noop() {
        let distributor = EventDistributor::start();
        let (registered, rx) = ChannelObserver::pair();
        let (never_registered, _rx2) = ChannelObserver::pair();
        distributor.register(registered);

        distributor.unregister(&never_registered);

        distributor.post(ChangeEvent::refresh_all());
        assert!(recv(&rx).is_refresh_all());
        distributor.shutdown();
    }

    #[test]
    fn test_double_registration_delivers_twice() {
        let distributor = EventDistributor::start();
        let (observer, rx) = ChannelObserver::pair();
        distributor.register(Arc::clone(&observer));
        distributor.register(Arc::clone(&observer));

        distributor.post(ChangeEvent::for_item(ItemId::new(7), None));
        distributor.shutdown();

        assert!(recv(&rx).items().contains(&ItemId::new(7)));
        assert!(recv(&rx).items().contains(&ItemId::new(7)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_poster_outlives_distributor_borrow() {
        let distributor = EventDistributor::start();
        let (observer, rx) = ChannelObserver::pair();
        distributor.register(observer);

        let poster = distributor.poster();
        poster.post(ChangeEvent::refresh_all());
        assert!(recv(&rx).is_refresh_all());

        drop(poster);
        distributor.shutdown();
    }
}
