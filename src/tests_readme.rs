// #![include_doc("../README.md", start)]
//! # unimut
//!
//! A unidirectional state container for Rust.
//!
//! A `Store` owns a state value. The state changes only when an action is dispatched:
//! the action passes through the store's middlewares, the reducer turns it into a new state,
//! and the new state is published to every live subscription.
//!
//! ```rust
//! use unimut::{middleware_fn, Store};
//!
//! let store = Store::builder(0, |n: &i32, state: &i32| state + n)
//!     .middleware(middleware_fn(|n: i32, _store: &Store<i32, i32>, next| {
//!         if n != 0 {
//!             next.run(n);
//!         }
//!     }))
//!     .dedup()
//!     .build();
//!
//! let _s = store.subscribe(|state| println!("state = {state}"));
//! store.dispatch(1);
//! store.dispatch(0);
//! assert_eq!(*store.state(), 1);
//! ```
//!
//! ## Subscriptions
//!
//! | method                           | callback receives                             | called when                 |
//! | -------------------------------- | --------------------------------------------- | --------------------------- |
//! | `subscribe`                      | the whole state                               | every publish               |
//! | `subscribe_select`               | `selector(state)`                             | every publish               |
//! | `subscribe_subtree`              | `path(state)`                                 | every publish               |
//! | `subscribe_subtree_dedup`        | `path(state)`                                 | the subtree changed         |
//! | `subscribe_subtree_select`       | `selector(path(state))`                       | every publish               |
//! | `subscribe_subtree_select_dedup` | `selector(path(state))`                       | the subtree changed         |
//!
//! The store holds subscribers weakly. Dropping the returned `Subscription` unsubscribes,
//! as does `Subscription::cancel` or `Store::cancel`.
//!
//! ## Publish policy
//!
//! `Store::new` publishes every reduced state.
//! `Store::new_dedup` (or `StoreBuilder::dedup`) publishes only if the reduced state differs
//! from the state before the dispatch began. The reduced state is stored in either case.
//!
//! ## License
//!
//! This project is dual licensed under Apache-2.0/MIT.
// #![include_doc("../README.md", end)]
