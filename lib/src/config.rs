use alloy_primitives::{address, b256, Address, B256};
use serde::{Deserialize, Serialize};

/// Number of slots in a batch.
pub const MAX_CLAIMS: usize = 10;

/// Kwenta Smart Margin v3.
pub const KWENTA_SMART_MARGIN_V3: Address = address!("e331a7eec851ba702aa8bf43070a178451d6d28e");

/// `ConditionalOrderExecuted(IPerpsMarketProxy.Data order, uint256 synthetixFees, uint256 executorFee)`
pub const CONDITIONAL_ORDER_EXECUTED: B256 =
    b256!("3f4c4edf80aee6ea6f4fb3aed498a467e30ed1482bc06539ffe892cf7304e334");

/// `order.request.accountId`
pub const ACCOUNT_ID_WORD: usize = 2;
/// `executorFee`
pub const EXECUTOR_FEE_WORD: usize = 9;

/// Incentive program parameters. Offsets count 32-byte words into the log data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimConfig {
    pub max_claims: usize,
    pub expected_contract: Address,
    pub event_schema: Option<B256>,
    pub identity_offset: usize,
    pub amount_offset: usize,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            max_claims: MAX_CLAIMS,
            expected_contract: KWENTA_SMART_MARGIN_V3,
            event_schema: Some(CONDITIONAL_ORDER_EXECUTED),
            identity_offset: ACCOUNT_ID_WORD,
            amount_offset: EXECUTOR_FEE_WORD,
        }
    }
}

impl ClaimConfig {
    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }
}
