use thiserror::Error;

/// Failures surfaced by the durable record store.
///
/// There is exactly one operational kind: the store could not complete a
/// read or a write. Absence of data is never an error; queries on an empty
/// store return empty results. The core never retries internally, so the
/// caller decides on retry, backoff, or degradation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable during {context}: {source}")]
    Unavailable {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

impl StoreError {
    pub(crate) fn unavailable<E>(context: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Unavailable {
            context,
            source: Box::new(source),
        }
    }
}
