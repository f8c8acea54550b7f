//! One-time global stylesheet rule insertion.

use std::cell::Cell;

use tracing::debug;

use crate::error::ProviderResult;

/// Page-session flag guarding a provider's one-time CSS rule.
///
/// Calls may interleave across rows and passes; only the first successful
/// insertion flips the flag. A failed insertion leaves it unset so a later
/// row retries.
#[derive(Debug, Default)]
pub struct StyleOnce {
    inserted: Cell<bool>,
}

impl StyleOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `insert` unless the rule is already in place.
    ///
    /// Returns `Ok(true)` when this call inserted the rule.
    pub fn ensure<F>(&self, insert: F) -> ProviderResult<bool>
    where
        F: FnOnce() -> ProviderResult<()>,
    {
        if self.inserted.get() {
            return Ok(false);
        }
        insert()?;
        self.inserted.set(true);
        debug!("one-time style rule inserted");
        Ok(true)
    }

    #[inline]
    pub fn is_inserted(&self) -> bool {
        self.inserted.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_inserts_once() {
        let style = StyleOnce::new();
        let mut calls = 0;

        for _ in 0..5 {
            style
                .ensure(|| {
                    calls += 1;
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(calls, 1);
        assert!(style.is_inserted());
    }

    #[test]
    fn test_failure_allows_retry() {
        let style = StyleOnce::new();

        let first = style.ensure(|| Err(ProviderError::StyleInsertion("no head".into())));
        assert!(first.is_err());
        assert!(!style.is_inserted());

        assert_eq!(style.ensure(|| Ok(())), Ok(true));
        assert_eq!(style.ensure(|| Ok(())), Ok(false));
    }
}
