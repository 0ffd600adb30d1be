use std::future::IntoFuture;
use std::time::Duration;

/// Outcome of [`race_deadline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raced<T> {
    Settled(T),
    TimedOut,
}

impl<T> Raced<T> {
    pub fn settled(self) -> Option<T> {
        match self {
            Raced::Settled(value) => Some(value),
            Raced::TimedOut => None,
        }
    }
}

/// Run `fut` against a deadline; whichever finishes first decides the outcome.
///
/// The losing future is dropped.
pub async fn race_deadline<F>(fut: F, deadline: Duration) -> Raced<F::Output>
where
    F: IntoFuture,
{
    let fut = fut.into_future();

    tokio::select! {
        biased;
        output = fut => Raced::Settled(output),
        _ = tokio::time::sleep(deadline) => Raced::TimedOut,
    }
}
