//! Test-then-rollback for freshly written alert channels
//!
//! After a create or update the channel is exercised through the test
//! endpoint. A channel that fails is deleted again so it is never left
//! active in an unverified state. Neither call is retried.

use crate::error::{ProviderError, Result};
use lacework_api::IntegrationsApi;

/// Test integration `guid`; delete it if the test fails.
///
/// - test ok: `Ok(())`, nothing deleted
/// - test fails, delete ok: [`ProviderError::VerificationFailed`] carrying the
///   test error; the caller must forget the guid
/// - test fails, delete fails: [`ProviderError::RollbackFailed`] carrying both
///   errors; the integration still exists remotely
pub async fn verify_and_rollback(client: &dyn IntegrationsApi, guid: &str) -> Result<()> {
    tracing::debug!("Testing integration {}", guid);

    let test_error = match client.test(guid).await {
        Ok(()) => {
            tracing::info!("Integration {} passed its test", guid);
            return Ok(());
        }
        Err(e) => e,
    };

    tracing::warn!(
        "Integration {} failed its test, deleting it: {}",
        guid,
        test_error
    );

    match client.delete(guid).await {
        Ok(()) => Err(ProviderError::VerificationFailed {
            guid: guid.to_string(),
            source: test_error,
        }),
        Err(delete_error) => {
            tracing::error!("Rollback of integration {} failed: {}", guid, delete_error);
            Err(ProviderError::RollbackFailed {
                guid: guid.to_string(),
                test: test_error,
                delete: delete_error,
            })
        }
    }
}
