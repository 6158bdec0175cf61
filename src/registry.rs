use std::rc::{Rc, Weak};

use slabmap::SlabMap;

use crate::SubscriptionId;


pub(crate) struct Subscriber<S: 'static>(Box<dyn Fn(&S)>);

impl<S: 'static> Subscriber<S> {
    pub fn new(f: impl Fn(&S) + 'static) -> Rc<Self> {
        Rc::new(Self(Box::new(f)))
    }
    pub fn publish(&self, state: &S) {
        (self.0)(state)
    }
}

struct Entry<S: 'static> {
    serial: u64,
    node: Weak<Subscriber<S>>,
}

/// Set of subscribers keyed by [`SubscriptionId`], holding each subscriber weakly.
pub(crate) struct Registry<S: 'static>(SlabMap<Entry<S>>);

impl<S: 'static> Registry<S> {
    pub fn new() -> Self {
        Self(SlabMap::new())
    }

    pub fn insert(&mut self, node: &Rc<Subscriber<S>>) -> SubscriptionId {
        let serial = SubscriptionId::next_serial();
        let key = self.0.insert(Entry {
            serial,
            node: Rc::downgrade(node),
        });
        SubscriptionId::new(key, serial)
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        matches!(self.0.get(id.key), Some(e) if e.serial == id.serial)
    }

    /// Removes the entry for `id`. Ids that are unknown or already removed are ignored.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        if self.contains(id) {
            self.0.remove(id.key);
            true
        } else {
            false
        }
    }

    /// Number of entries whose subscriber is still alive.
    pub fn len(&self) -> usize {
        self.0.iter().filter(|(_, e)| e.node.strong_count() > 0).count()
    }

    /// Returns the live subscribers and drops entries whose subscriber is gone.
    pub fn snapshot(&mut self) -> Vec<(SubscriptionId, Rc<Subscriber<S>>)> {
        self.0.optimize();
        let mut live = Vec::with_capacity(self.0.len());
        let mut dead = Vec::new();
        for (key, e) in self.0.iter() {
            match e.node.upgrade() {
                Some(node) => live.push((SubscriptionId::new(key, e.serial), node)),
                None => dead.push(key),
            }
        }
        if !dead.is_empty() {
            log::debug!("purging {} released subscriber(s)", dead.len());
            for key in dead {
                self.0.remove(key);
            }
        }
        live
    }
}
