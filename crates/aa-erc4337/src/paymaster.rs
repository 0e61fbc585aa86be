//! The ERC-20 paymaster pre-approval path (v0.7 only): ensuring the smart
//! account has allowance before the first real UserOp, and the balance-slot
//! state override used so gas estimation succeeds regardless of the
//! account's real token balance.

use crate::abi::{balance_storage_slot, encode_erc20_approve};
use crate::bundler::{StateOverride, StateOverrides};
use crate::config::MAX_ERC20_ALLOWANCE;
use aa_evm_signing::Address;
use primitive_types::U256;
use std::collections::HashMap;

/// Builds `approve(paymaster, 2^96 - 1)` calldata for the ERC-20 token the
/// paymaster charges in.
pub fn build_max_approval_calldata(paymaster: Address) -> Vec<u8> {
    encode_erc20_approve(paymaster, U256::from(MAX_ERC20_ALLOWANCE))
}

/// Builds a state override setting `token`'s `balances[account]` slot to
/// `2^96 - 1`, so `eth_estimateUserOperationGas` succeeds with the paymaster
/// active even if the account holds no real balance yet.
pub fn build_balance_override(
    token: Address,
    account: Address,
    balance_storage_slot_index: U256,
) -> StateOverrides {
    let slot = balance_storage_slot(account, balance_storage_slot_index);
    let mut max_balance_word = [0u8; 32];
    U256::from(MAX_ERC20_ALLOWANCE).to_big_endian(&mut max_balance_word);

    let mut state_diff = HashMap::new();
    state_diff.insert(format!("0x{}", hex::encode(slot)), format!("0x{}", hex::encode(max_balance_word)));

    let mut overrides = HashMap::new();
    overrides.insert(token, StateOverride { state_diff });
    overrides
}

/// Cooperative re-entrancy guard: the approval UserOp itself goes through
/// `SendTransaction`, which re-enters the builder. The guard lets the
/// re-entrant call skip straight past the approval check instead of
/// looping forever. An RAII handle clears the flag on drop, including on
/// an unwinding panic, rather than relying on the caller to remember to
/// reset it.
#[derive(Debug, Default)]
pub struct ApprovalGuard {
    is_approving: std::cell::Cell<bool>,
}

impl ApprovalGuard {
    pub fn is_approving(&self) -> bool {
        self.is_approving.get()
    }

    pub fn enter(&self) -> ApprovalGuardHandle<'_> {
        self.is_approving.set(true);
        ApprovalGuardHandle { guard: self }
    }
}

pub struct ApprovalGuardHandle<'a> {
    guard: &'a ApprovalGuard,
}

impl Drop for ApprovalGuardHandle<'_> {
    fn drop(&mut self) {
        self.guard.is_approving.set(false);
    }
}
