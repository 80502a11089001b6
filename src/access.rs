//! Access Control
//!
//! Two roles: the operator master, who hands out the operator role, and
//! operators, who run every admin setter. The master starts as an operator
//! but holds the two roles independently.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::id::Address;
use crate::error::EconomyError;

/// Role assignments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    master: Address,
    operators: BTreeSet<Address>,
}

impl Roles {
    /// Create roles with `master` as master and sole operator.
    pub fn new(master: Address) -> Self {
        let mut operators = BTreeSet::new();
        operators.insert(master);
        Self { master, operators }
    }

    /// Current operator master.
    pub fn master(&self) -> Address {
        self.master
    }

    /// Check if `account` is an operator.
    pub fn is_operator(&self, account: &Address) -> bool {
        self.operators.contains(account)
    }

    /// All operators in address order.
    pub fn operators(&self) -> impl Iterator<Item = &Address> {
        self.operators.iter()
    }

    /// Fail with `OnlyOperator` unless `account` is an operator.
    pub fn ensure_operator(&self, account: &Address) -> Result<(), EconomyError> {
        if self.is_operator(account) {
            Ok(())
        } else {
            Err(EconomyError::OnlyOperator)
        }
    }

    /// Fail with `OnlyOperatorMaster` unless `account` is the master.
    pub fn ensure_master(&self, account: &Address) -> Result<(), EconomyError> {
        if *account == self.master {
            Ok(())
        } else {
            Err(EconomyError::OnlyOperatorMaster)
        }
    }

    /// Grant the operator role. Returns false if already held.
    pub fn grant_operator(&mut self, account: Address) -> bool {
        self.operators.insert(account)
    }

    /// Revoke the operator role. Returns false if not held.
    pub fn revoke_operator(&mut self, account: &Address) -> bool {
        self.operators.remove(account)
    }

    /// Hand the master role to another account.
    pub fn transfer_master(&mut self, account: Address) {
        self.master = account;
    }
}
