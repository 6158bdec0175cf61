use std::rc::Weak;

use derive_ex::derive_ex;
use parse_display::Display;

use crate::{store::StoreNode, Store};

/// A weak handle that dispatches actions to a [`Store`].
///
/// Holding a `Dispatcher` does not keep the store alive, so it can be moved into
/// long-lived callbacks or spawned tasks started by a middleware.
#[derive_ex(Clone, bound())]
pub struct Dispatcher<S: 'static, A: 'static>(Weak<StoreNode<S, A>>);

impl<S: 'static, A: 'static> Dispatcher<S, A> {
    pub(crate) fn new(node: Weak<StoreNode<S, A>>) -> Self {
        Self(node)
    }

    /// Returns the store if it still exists.
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.0.upgrade().map(Store::from_node)
    }

    /// Dispatches `action` to the store.
    ///
    /// If the store has been dropped, the action is discarded.
    pub fn dispatch(&self, action: A) {
        if let Err(e) = self.try_dispatch(action) {
            log::warn!("Dispatcher: action discarded: {e}");
        }
    }

    /// Dispatches `action` to the store, or returns [`StoreError::Dropped`] if the store no longer exists.
    pub fn try_dispatch(&self, action: A) -> Result<(), StoreError> {
        let store = self.upgrade().ok_or(StoreError::Dropped)?;
        store.dispatch(action);
        Ok(())
    }
}

/// Error returned by fallible operations on a [`Dispatcher`].
#[non_exhaustive]
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[display("store has been dropped")]
    Dropped,
}

impl std::error::Error for StoreError {}
