/// Errors returned by [`crate::Controller`].
///
/// `E` is the error type of the wrapped data source.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    #[error("no display surface is attached")]
    NotAttached,
    #[error("a display surface is already attached")]
    AlreadyAttached,
    #[error("data source failed")]
    Source(#[source] E),
}
