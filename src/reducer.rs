/// A pure function computing the next state from an action and the current state.
///
/// Closures of the form `Fn(&A, &S) -> S` implement this trait.
///
/// ```
/// use unimut::Reducer;
///
/// enum Action {
///     Add(i32),
/// }
///
/// let reducer = |action: &Action, state: &i32| match action {
///     Action::Add(n) => state + n,
/// };
/// assert_eq!(reducer.reduce(&Action::Add(2), &3), 5);
/// ```
pub trait Reducer<S, A> {
    fn reduce(&self, action: &A, state: &S) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&A, &S) -> S,
{
    fn reduce(&self, action: &A, state: &S) -> S {
        self(action, state)
    }
}
