//! A unidirectional state container.
//!
//! A [`Store`] owns a state value that changes only when an action is dispatched.
//! Each action passes through the store's [`Middleware`]s, is turned into a new state by the [`Reducer`],
//! and the new state is published to every live [`Subscription`].
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use unimut::Store;
//!
//! #[derive(Clone, PartialEq, Default)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! enum Action {
//!     IncrementBy(i32),
//! }
//!
//! let store = Store::new_dedup(Counter::default(), |action: &Action, state: &Counter| {
//!     match action {
//!         Action::IncrementBy(n) => Counter { count: state.count + n },
//!     }
//! });
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let _s = store.subscribe_subtree_dedup(|s: &Counter| &s.count, {
//!     let seen = seen.clone();
//!     move |count| seen.borrow_mut().push(*count)
//! });
//!
//! store.dispatch(Action::IncrementBy(5));
//! store.dispatch(Action::IncrementBy(0));
//!
//! assert_eq!(*seen.borrow(), vec![5]);
//! assert_eq!(store.state().count, 5);
//! ```
//!
//! Subscriptions are held weakly by the store: dropping the returned [`Subscription`] unsubscribes.

mod dispatcher;
mod middleware;
mod reducer;
mod registry;
mod selector;
mod store;
mod subscription;

#[cfg(doctest)]
mod tests_readme;

pub use dispatcher::*;
pub use middleware::*;
pub use reducer::*;
pub use selector::*;
pub use store::{PublishPolicy, Store, StoreBuilder};
pub use subscription::*;
