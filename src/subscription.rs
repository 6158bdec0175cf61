use std::{
    any::Any,
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use parse_display::Display;


static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Subscription`].
///
/// Unique within the process for the lifetime of the subscription, regardless of which store issued it.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("#{serial}")]
pub struct SubscriptionId {
    pub(crate) key: usize,
    pub(crate) serial: u64,
}

impl SubscriptionId {
    pub(crate) fn new(key: usize, serial: u64) -> Self {
        Self { key, serial }
    }
    pub(crate) fn next_serial() -> u64 {
        NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
    }
}

/// A handle that keeps a subscriber registered with a [`Store`](crate::Store).
///
/// The store only holds a weak reference to the subscriber.
/// When the `Subscription` is dropped, the subscriber is removed and its callback is never called again.
#[must_use]
pub struct Subscription {
    id: SubscriptionId,
    _node: Rc<dyn Any>,
    unsubscribe: Cell<Option<Box<dyn FnOnce(SubscriptionId) -> bool>>>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        node: Rc<dyn Any>,
        unsubscribe: impl FnOnce(SubscriptionId) -> bool + 'static,
    ) -> Self {
        Self {
            id,
            _node: node,
            unsubscribe: Cell::new(Some(Box::new(unsubscribe))),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stops any further callbacks for this subscription.
    ///
    /// Returns `true` if this call removed the subscriber from its store.
    /// Calling this more than once, or after the store has been dropped, does nothing.
    pub fn cancel(&self) -> bool {
        match self.unsubscribe.take() {
            Some(unsubscribe) => unsubscribe(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Subscription {}

impl Hash for Subscription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}
