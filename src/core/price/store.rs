use crate::domain::model::{Price, PriceSnapshot, PriceStatus};
use crate::domain::ports::PriceObserver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug, Default)]
struct StoreState {
    current: Option<PriceSnapshot>,
    status: PriceStatus,
}

/// Holder of the one current price. Writes replace the whole value, last write wins.
///
/// Observers are notified after the state lock is released, so an observer may read
/// the store from its callback. It must not write to it: writes are serialized with
/// their notifications, so observers see updates in the order the store applied them.
#[derive(Default)]
pub struct PriceStore {
    state: RwLock<StoreState>,
    publish: Mutex<()>,
    observers: RwLock<Vec<(ObserverId, Arc<dyn PriceObserver>)>>,
    next_observer: AtomicU64,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PriceSnapshot> {
        self.read_state(|state| state.current.clone())
    }

    pub fn current_price(&self) -> Option<Price> {
        self.read_state(|state| state.current.as_ref().map(|s| s.price))
    }

    pub fn status(&self) -> PriceStatus {
        self.read_state(|state| state.status.clone())
    }

    pub fn begin_fetch(&self) {
        self.set_status(PriceStatus::Loading);
    }

    pub fn set_current_and_notify(&self, snapshot: PriceSnapshot) {
        let status = PriceStatus::Live {
            source: snapshot.source.clone(),
        };
        let _publishing = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.current = Some(snapshot.clone());
            state.status = status.clone();
        }

        for observer in self.observers() {
            observer.on_price(&snapshot);
            observer.on_status(&status);
        }
    }

    /// Every source failed. The previous price, if any, stays readable.
    pub fn mark_unavailable(&self) {
        self.set_status(PriceStatus::Unavailable);
    }

    pub fn subscribe(&self, observer: Arc<dyn PriceObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn set_status(&self, status: PriceStatus) {
        let _publishing = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.status = status.clone();
        }

        for observer in self.observers() {
            observer.on_status(&status);
        }
    }

    fn observers(&self) -> Vec<Arc<dyn PriceObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    fn read_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}
