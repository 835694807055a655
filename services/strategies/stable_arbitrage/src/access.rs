//! Single-owner access control for side-effecting operations

use ethers::types::Address;
use tracing::warn;

use crate::error::{ArbitrageError, Result};

/// Owner fixed at construction; there is no transfer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessController {
    owner: Address,
}

impl AccessController {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn require_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            warn!("Rejected call from non-owner {:?}", caller);
            return Err(ArbitrageError::Unauthorized { caller });
        }
        Ok(())
    }
}
