//! Storage collaborator contract.
//!
//! The engine never calls a store; callers load a snapshot, run the engine,
//! and save a new snapshot if the user applies a preview.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::LoanEngineError;
use crate::types::LoanSnapshot;
use crate::LoanEngineResult;

pub trait LoanStore: Send + Sync {
    fn load(&self, loan_id: &str) -> LoanEngineResult<LoanSnapshot>;
    fn save(&self, loan: LoanSnapshot) -> LoanEngineResult<()>;
}

/// Process-local store, keyed by [`LoanSnapshot::id`].
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    loans: RwLock<HashMap<String, LoanSnapshot>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loans.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LoanStore for InMemoryLoanStore {
    fn load(&self, loan_id: &str) -> LoanEngineResult<LoanSnapshot> {
        self.loans
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(loan_id)
            .cloned()
            .ok_or_else(|| LoanEngineError::NotFound(loan_id.to_string()))
    }

    fn save(&self, loan: LoanSnapshot) -> LoanEngineResult<()> {
        if loan.id.is_empty() {
            return Err(LoanEngineError::validation("id", "A stored loan needs an id"));
        }
        loan.validate()?;
        self.loans
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(loan.id.clone(), loan);
        Ok(())
    }
}
