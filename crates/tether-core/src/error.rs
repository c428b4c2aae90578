use thiserror::Error;

/// Failures surfaced by the state layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// An update listener's asynchronous reaction failed.
    ///
    /// By the time listeners run the state has already been merged, so a
    /// failing listener never corrupts the container; it also stays
    /// registered. The failure only travels back through the aggregate
    /// completion of the `mutate` call that triggered it.
    #[error("update listener failed: {0}")]
    Listener(String),
}

impl StateError {
    pub fn listener(message: impl Into<String>) -> Self {
        StateError::Listener(message.into())
    }
}
