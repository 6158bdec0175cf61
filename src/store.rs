use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
};

use derive_ex::derive_ex;
use parse_display::Display;
use serde::{Serialize, Serializer};

use crate::{
    registry::{Registry, Subscriber},
    Dispatcher, Middleware, Next, Reducer, Selector, Subscription, SubscriptionId,
};


/// Decides whether a reduced state is published to subscribers.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Default)]
#[display(style = "snake_case")]
pub enum PublishPolicy {
    /// Every reduced state is published.
    #[default]
    Always,
    /// A reduced state is published only if it differs from the state before the dispatch began.
    Changed,
}

/// Owns a state and updates it only by running dispatched actions through middlewares and a reducer.
///
/// `Store` is a cheap handle; clones share the same state and subscribers.
/// It is confined to the thread that created it.
#[derive_ex(Clone, bound())]
pub struct Store<S: 'static, A: 'static>(Rc<StoreNode<S, A>>);

pub(crate) struct StoreNode<S: 'static, A: 'static> {
    state: RefCell<Rc<S>>,
    reducer: Box<dyn Reducer<S, A>>,
    middlewares: Vec<Box<dyn Middleware<S, A>>>,
    changed: Option<fn(&S, &S) -> bool>,
    registry: RefCell<Registry<S>>,
}

impl<S: 'static, A: 'static> Store<S, A> {
    /// Create a store that publishes every reduced state.
    pub fn new(initial_state: S, reducer: impl Reducer<S, A> + 'static) -> Self {
        Self::builder(initial_state, reducer).build()
    }

    /// Create a store that publishes a reduced state only if it is not equal to the state before the dispatch.
    pub fn new_dedup(initial_state: S, reducer: impl Reducer<S, A> + 'static) -> Self
    where
        S: PartialEq,
    {
        Self::builder(initial_state, reducer).dedup().build()
    }

    /// Returns a builder for configuring middlewares and the publish policy.
    pub fn builder(initial_state: S, reducer: impl Reducer<S, A> + 'static) -> StoreBuilder<S, A> {
        StoreBuilder::new(initial_state, reducer)
    }

    pub(crate) fn from_node(node: Rc<StoreNode<S, A>>) -> Self {
        Self(node)
    }

    /// Returns the current state.
    pub fn state(&self) -> Rc<S> {
        self.0.state.borrow().clone()
    }

    /// Returns the publish policy chosen at construction.
    pub fn policy(&self) -> PublishPolicy {
        if self.0.changed.is_some() {
            PublishPolicy::Changed
        } else {
            PublishPolicy::Always
        }
    }

    /// Number of middlewares in the chain.
    pub fn middleware_count(&self) -> usize {
        self.0.middlewares.len()
    }

    /// Number of subscribers that are still registered and alive.
    pub fn subscription_count(&self) -> usize {
        self.0.registry.borrow().len()
    }

    /// Returns a handle that can dispatch to this store without keeping it alive.
    pub fn dispatcher(&self) -> Dispatcher<S, A> {
        Dispatcher::new(Rc::downgrade(&self.0))
    }

    /// Runs `action` through the middlewares and the reducer, then notifies subscribers.
    ///
    /// Returns after every subscriber notified for this action has returned.
    /// May be called from middlewares and subscribers; the nested dispatch completes before the caller continues.
    ///
    /// If a middleware, the reducer or a subscriber panics, the panic propagates to the caller
    /// and the state from before this dispatch stays current.
    pub fn dispatch(&self, action: A) {
        let rollback = Rollback {
            state: &self.0.state,
            previous: self.state(),
        };
        log::trace!(
            "dispatch: {} middleware(s), policy `{}`",
            self.0.middlewares.len(),
            self.policy()
        );
        let terminal = |action: A| self.reduce(&action, &rollback.previous);
        Next::new(&self.0.middlewares, self, &terminal).run(action);
    }

    fn reduce(&self, action: &A, previous: &S) {
        let state = self.0.reducer.reduce(action, &self.state());
        if self.0.changed.map_or(true, |changed| changed(previous, &state)) {
            self.publish(&state);
        } else {
            log::debug!("state unchanged, publish skipped");
        }
        let old = self.0.state.replace(Rc::new(state));
        drop(old);
    }

    fn publish(&self, state: &S) {
        let subscribers = self.0.registry.borrow_mut().snapshot();
        for (id, subscriber) in subscribers {
            if self.0.registry.borrow().contains(id) {
                subscriber.publish(state);
            }
        }
    }

    fn insert(&self, subscriber: Rc<Subscriber<S>>) -> Subscription {
        let id = self.0.registry.borrow_mut().insert(&subscriber);
        log::debug!("subscribe {id}");
        let node = Rc::downgrade(&self.0);
        Subscription::new(id, subscriber, move |id| {
            node.upgrade().is_some_and(|node| node.remove(id))
        })
    }

    /// Calls `f` with every new state.
    pub fn subscribe(&self, f: impl Fn(&S) + 'static) -> Subscription {
        self.insert(Subscriber::new(f))
    }

    /// Calls `f` with the output of `selector` for every new state.
    pub fn subscribe_select<Sel>(
        &self,
        selector: Sel,
        f: impl Fn(Sel::Output) + 'static,
    ) -> Subscription
    where
        Sel: Selector<S> + 'static,
    {
        self.insert(Subscriber::new(move |state| f(selector.select(state))))
    }

    /// Calls `f` with the part of every new state returned by `path`, whether or not that part changed.
    pub fn subscribe_subtree<T>(
        &self,
        path: impl Fn(&S) -> &T + 'static,
        f: impl Fn(&T) + 'static,
    ) -> Subscription
    where
        T: ?Sized + 'static,
    {
        self.insert(Subscriber::new(move |state| f(path(state))))
    }

    /// Calls `f` with the part of the state returned by `path`, only when that part changed.
    ///
    /// The first comparison is made against the value at the time of subscription.
    pub fn subscribe_subtree_dedup<T>(
        &self,
        path: impl Fn(&S) -> &T + 'static,
        f: impl Fn(&T) + 'static,
    ) -> Subscription
    where
        T: PartialEq + Clone + 'static,
    {
        let last = RefCell::new(path(&*self.state()).clone());
        self.insert(Subscriber::new(move |state| {
            let value = path(state);
            if update_if_changed(&last, value) {
                f(value)
            }
        }))
    }

    /// Calls `f` with the output of `selector` applied to the part of every new state returned by `path`.
    pub fn subscribe_subtree_select<T, Sel>(
        &self,
        path: impl Fn(&S) -> &T + 'static,
        selector: Sel,
        f: impl Fn(Sel::Output) + 'static,
    ) -> Subscription
    where
        T: ?Sized + 'static,
        Sel: Selector<T> + 'static,
    {
        self.insert(Subscriber::new(move |state| {
            f(selector.select(path(state)))
        }))
    }

    /// Calls `f` with the output of `selector` applied to the part of the state returned by `path`,
    /// only when that part changed.
    ///
    /// `selector` is not called while the part stays equal.
    pub fn subscribe_subtree_select_dedup<T, Sel>(
        &self,
        path: impl Fn(&S) -> &T + 'static,
        selector: Sel,
        f: impl Fn(Sel::Output) + 'static,
    ) -> Subscription
    where
        T: PartialEq + Clone + 'static,
        Sel: Selector<T> + 'static,
    {
        let last = RefCell::new(path(&*self.state()).clone());
        self.insert(Subscriber::new(move |state| {
            let value = path(state);
            if update_if_changed(&last, value) {
                f(selector.select(value))
            }
        }))
    }

    /// Removes `subscription` from this store.
    ///
    /// Returns `false` if it was already removed or belongs to another store.
    pub fn cancel(&self, subscription: &Subscription) -> bool {
        self.0.remove(subscription.id())
    }
}

impl<S: 'static, A: 'static> StoreNode<S, A> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.borrow_mut().remove(id);
        if removed {
            log::debug!("cancel {id}");
        }
        removed
    }
}

/// Puts the state from before a dispatch back if the dispatch unwinds.
struct Rollback<'a, S> {
    state: &'a RefCell<Rc<S>>,
    previous: Rc<S>,
}

impl<S> Drop for Rollback<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut state) = self.state.try_borrow_mut() {
                let old = std::mem::replace(&mut *state, self.previous.clone());
                drop(state);
                drop(old);
                log::debug!("dispatch unwound, previous state restored");
            }
        }
    }
}

fn update_if_changed<T: PartialEq + Clone>(last: &RefCell<T>, value: &T) -> bool {
    let mut last = last.borrow_mut();
    if *last != *value {
        last.clone_from(value);
        true
    } else {
        false
    }
}

impl<S: fmt::Debug + 'static, A: 'static> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state())
            .field("policy", &self.policy())
            .field("middlewares", &self.middleware_count())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl<S, A> Serialize for Store<S, A>
where
    S: Serialize + 'static,
    A: 'static,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        S::serialize(&self.state(), serializer)
    }
}

/// A builder for creating a [`Store`].
pub struct StoreBuilder<S: 'static, A: 'static> {
    state: S,
    reducer: Box<dyn Reducer<S, A>>,
    middlewares: Vec<Box<dyn Middleware<S, A>>>,
    changed: Option<fn(&S, &S) -> bool>,
}

impl<S: 'static, A: 'static> StoreBuilder<S, A> {
    /// Starts with no middlewares and [`PublishPolicy::Always`].
    pub fn new(initial_state: S, reducer: impl Reducer<S, A> + 'static) -> Self {
        Self {
            state: initial_state,
            reducer: Box::new(reducer),
            middlewares: Vec::new(),
            changed: None,
        }
    }

    /// Appends a middleware. Middlewares see actions in the order they were added.
    pub fn middleware(mut self, middleware: impl Middleware<S, A> + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Appends middlewares in iteration order, after any already added.
    pub fn middlewares(
        mut self,
        middlewares: impl IntoIterator<Item = Box<dyn Middleware<S, A>>>,
    ) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Use [`PublishPolicy::Changed`].
    pub fn dedup(mut self) -> Self
    where
        S: PartialEq,
    {
        let changed: fn(&S, &S) -> bool = |previous, state| previous != state;
        self.changed = Some(changed);
        self
    }

    pub fn build(self) -> Store<S, A> {
        Store(Rc::new(StoreNode {
            state: RefCell::new(Rc::new(self.state)),
            reducer: self.reducer,
            middlewares: self.middlewares,
            changed: self.changed,
            registry: RefCell::new(Registry::new()),
        }))
    }
}
