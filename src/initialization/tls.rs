//! TLS connector setup.
//!
//! Both TLS sessions a target may need are driven from connectors built once
//! at startup and cloned into the workers.

use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use tokio_rustls::TlsConnector;

use crate::error_handling::InitializationError;
use crate::probe::{inspection_config, validation_config};

/// Builds the connector pair used by every probe worker.
///
/// The first connector accepts any certificate and feeds the inspector; the
/// second verifies chains against the webpki roots and feeds the validator.
///
/// # Errors
///
/// Returns `InitializationError::TlsSetupError` if no crypto provider is
/// installed or the webpki verifier cannot be built.
pub fn init_tls_connectors() -> Result<(TlsConnector, TlsConnector), InitializationError> {
    let provider = CryptoProvider::get_default().cloned().ok_or_else(|| {
        InitializationError::TlsSetupError("no default crypto provider installed".to_string())
    })?;

    let inspect = TlsConnector::from(Arc::new(inspection_config(provider)));
    let validate = TlsConnector::from(Arc::new(validation_config()?));
    Ok((inspect, validate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::init_crypto_provider;

    #[test]
    fn test_init_tls_connectors() {
        init_crypto_provider();
        let result = init_tls_connectors();
        assert!(result.is_ok());
    }
}
