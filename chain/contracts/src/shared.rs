//! Serialized access to one `SupplyChain` from many threads
//!
//! Every call holds the lock for its whole read-validate-mutate-emit
//! sequence, so concurrent callers observe a single total order of calls.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::chain::SupplyChain;
use crate::errors::ContractError;
use crate::rail::{LocalRail, PaymentRail};

/// Cloneable handle to a contract behind one exclusive lock
#[derive(Debug)]
pub struct SharedSupplyChain<R: PaymentRail = LocalRail> {
    inner: Arc<Mutex<SupplyChain<R>>>,
}

impl<R: PaymentRail> Clone for SharedSupplyChain<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: PaymentRail> SharedSupplyChain<R> {
    pub fn new(chain: SupplyChain<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(chain)),
        }
    }

    /// Run a mutating call under the lock.
    pub fn execute<T, F>(&self, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&mut SupplyChain<R>) -> Result<T, ContractError>,
    {
        let mut guard = self.lock()?;
        f(&mut guard)
    }

    /// Run a read under the lock.
    pub fn read<T, F>(&self, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&SupplyChain<R>) -> T,
    {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SupplyChain<R>>, ContractError> {
        self.inner.lock().map_err(|_| ContractError::Poisoned)
    }
}
