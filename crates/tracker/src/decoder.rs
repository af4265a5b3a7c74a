//! Dispatch error decoding.

use tracing::debug;
use zkv_core::ChainClient;
use zkv_types::{DecodedDispatchError, DispatchError};

/// Translate a dispatch error into a human-diagnosable form.
///
/// Module errors are resolved against the client's runtime metadata. Anything
/// else, including a module error the metadata does not know, falls back to
/// the error's string form. Never fails.
pub fn decode_dispatch_error<C: ChainClient>(
    client: &C,
    error: &DispatchError,
) -> DecodedDispatchError {
    if let Some(module) = error.as_module() {
        match client.decode_module_error(module) {
            Ok(meta) => return meta.into(),
            Err(e) => {
                debug!(error = %e, "Module error not in metadata, using raw form");
            }
        }
    }

    DecodedDispatchError::Other {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkv_test_helpers::{fixtures, MockChain};
    use zkv_types::ModuleError;

    #[test]
    fn test_module_error_resolved_from_metadata() {
        let chain = MockChain::new().with_registry(fixtures::registry());

        let decoded = decode_dispatch_error(&chain, &fixtures::verify_error());
        assert_eq!(
            decoded.to_string(),
            "settlementGroth16Pallet.VerifyError: Provided data has not valid proof."
        );
        assert!(matches!(decoded, DecodedDispatchError::Module { .. }));
    }

    #[test]
    fn test_unknown_module_error_falls_back() {
        let chain = MockChain::new();
        let error = DispatchError::Module(ModuleError::new(40, 3));

        let decoded = decode_dispatch_error(&chain, &error);
        assert_eq!(
            decoded,
            DecodedDispatchError::Other {
                message: error.to_string()
            }
        );
    }

    #[test]
    fn test_non_module_error_uses_string_form() {
        let chain = MockChain::new().with_registry(fixtures::registry());

        let decoded = decode_dispatch_error(&chain, &DispatchError::BadOrigin);
        assert_eq!(
            decoded,
            DecodedDispatchError::Other {
                message: "BadOrigin".into()
            }
        );
    }
}
