//! Pre-submission account checks.

use crate::TrackError;
use tracing::{error, info};
use zkv_core::ChainClient;

/// Refuse to submit from an account with no free balance.
///
/// Returns the free balance when it is non-zero.
pub async fn ensure_account_funded<C: ChainClient>(
    client: &C,
    signer: &C::Signer,
) -> Result<u128, TrackError> {
    let free = client.free_balance(signer).await?;
    if free == 0 {
        error!("The account has insufficient funds.");
        return Err(TrackError::InsufficientFunds);
    }
    info!(free_balance = %free, "Account balance checked");
    Ok(free)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkv_test_helpers::MockChain;

    #[tokio::test]
    async fn test_funded_account_passes() {
        let chain = MockChain::new().with_free_balance(5);
        let counters = chain.counters();

        assert_eq!(ensure_account_funded(&chain, &()).await.unwrap(), 5);
        assert_eq!(counters.balance_checks(), 1);
    }

    #[tokio::test]
    async fn test_empty_account_is_refused() {
        let chain = MockChain::new().with_free_balance(0);

        let err = ensure_account_funded(&chain, &()).await.unwrap_err();
        assert!(matches!(err, TrackError::InsufficientFunds));
        assert_eq!(err.to_string(), "The account has insufficient funds");
    }
}
