use derive_ex::derive_ex;

use crate::Store;


/// Intercepts every action dispatched to a [`Store`] before it reaches the reducer.
///
/// A middleware receives the action, the store it runs in, and the remainder of the chain as [`Next`].
/// Code placed before `next.run(action)` runs on the way in, code placed after it runs once the
/// inner middlewares, the reducer and all subscribers have finished.
///
/// - [`Store::state`] reads the current state at the moment it is called.
/// - [`Store::dispatch`] dispatches a new action through the whole pipeline, re-entrantly.
/// - [`Store::dispatcher`] gives a weak handle that can dispatch later, e.g. from a spawned task.
/// - Not calling `next.run` drops the action; the reducer never sees it.
///
/// ```
/// use unimut::{middleware_fn, Store};
///
/// let store = Store::builder(0, |n: &i32, state: &i32| state + n)
///     .middleware(middleware_fn(|action: i32, _store: &Store<i32, i32>, next| {
///         if action != 0 {
///             next.run(action);
///         }
///     }))
///     .build();
/// store.dispatch(2);
/// assert_eq!(*store.state(), 2);
/// ```
pub trait Middleware<S: 'static, A: 'static> {
    fn apply(&self, action: A, store: &Store<S, A>, next: Next<'_, S, A>);

    /// Name used in trace logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<S, A, F> Middleware<S, A> for F
where
    S: 'static,
    A: 'static,
    F: Fn(A, &Store<S, A>, Next<'_, S, A>),
{
    fn apply(&self, action: A, store: &Store<S, A>, next: Next<'_, S, A>) {
        self(action, store, next)
    }
}

/// Helps type inference for closures used as [`Middleware`].
pub fn middleware_fn<S, A, F>(f: F) -> F
where
    S: 'static,
    A: 'static,
    F: Fn(A, &Store<S, A>, Next<'_, S, A>) + 'static,
{
    f
}

/// The rest of the middleware chain, ending with the reducer.
#[derive_ex(Clone, Copy, bound())]
pub struct Next<'a, S: 'static, A: 'static> {
    middlewares: &'a [Box<dyn Middleware<S, A>>],
    store: &'a Store<S, A>,
    terminal: &'a dyn Fn(A),
}

impl<'a, S: 'static, A: 'static> Next<'a, S, A> {
    pub(crate) fn new(
        middlewares: &'a [Box<dyn Middleware<S, A>>],
        store: &'a Store<S, A>,
        terminal: &'a dyn Fn(A),
    ) -> Self {
        Self {
            middlewares,
            store,
            terminal,
        }
    }

    /// Passes `action` to the next middleware, or to the reducer if this is the last one.
    ///
    /// May be called any number of times.
    pub fn run(self, action: A) {
        match self.middlewares.split_first() {
            Some((middleware, rest)) => {
                log::trace!("middleware `{}`", middleware.name());
                middleware.apply(
                    action,
                    self.store,
                    Next {
                        middlewares: rest,
                        ..self
                    },
                )
            }
            None => (self.terminal)(action),
        }
    }

    /// Number of middlewares left before the reducer.
    pub fn remaining(&self) -> usize {
        self.middlewares.len()
    }
}
