/// Transforms a state (or a subtree of it) into another representation.
///
/// Selectors are stateless and can be shared between subscriptions.
/// Closures of the form `Fn(&T) -> O` implement this trait.
pub trait Selector<T: ?Sized> {
    type Output;
    fn select(&self, state: &T) -> Self::Output;
}

impl<T, O, F> Selector<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> O,
{
    type Output = O;
    fn select(&self, state: &T) -> O {
        self(state)
    }
}
