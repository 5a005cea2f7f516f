//! Named policies, so call sites can say "use the `db` policy" without
//! rebuilding it. The registry is an ordinary value owned by the caller.

use std::collections::HashMap;
use std::fmt;

use super::error::RetryError;
use super::policy::Policy;
use super::run::Retrier;

/// Lookup of a name that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no retry policy registered under {0:?}")]
pub struct UnknownPolicy(pub String);

#[derive(Debug)]
pub struct PolicyRegistry<E> {
    policies: HashMap<String, Policy<E>>,
}

impl<E> Default for PolicyRegistry<E> {
    fn default() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }
}

impl<E> PolicyRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `policy` under `name`, returning the policy it replaced.
    pub fn register(&mut self, name: impl Into<String>, policy: Policy<E>) -> Option<Policy<E>> {
        self.policies.insert(name.into(), policy)
    }

    pub fn get(&self, name: &str) -> Option<&Policy<E>> {
        self.policies.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Policy<E>> {
        self.policies.remove(name)
    }

    pub fn clear(&mut self) {
        self.policies.clear();
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// A retrier for the policy registered under `name`.
    pub fn retrier(&self, name: &str) -> Result<Retrier<E>, UnknownPolicy> {
        self.get(name)
            .cloned()
            .map(Retrier::new)
            .ok_or_else(|| UnknownPolicy(name.to_string()))
    }
}

impl<E: fmt::Display> PolicyRegistry<E> {
    /// Run `work` under the policy registered as `name`.
    ///
    /// The outer error is the lookup; the inner one is the retry outcome.
    pub fn with_retry<T, F>(
        &self,
        name: &str,
        work: F,
    ) -> Result<Result<T, RetryError<E>>, UnknownPolicy>
    where
        F: FnMut(u32) -> Result<T, E>,
    {
        Ok(self.retrier(name)?.execute(work))
    }
}
