// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

lazy_static::lazy_static! {
    static ref GLOBAL: Crypto = Crypto::new(CryptoConfig::default());
}

/// Entry point: one native provider, its algorithm registry and the policy
/// applied on top of it.
///
/// Engines borrow the instance; a `Crypto` is cheap to share across threads.
pub struct Crypto {
    provider: Arc<dyn NativeProvider>,
    registry: Registry,
    config: CryptoConfig,
}

impl Crypto {
    /// Instance over the provider compiled in for this target.
    pub fn new(config: CryptoConfig) -> Self {
        Self::with_provider(Arc::new(DefaultProvider::new()), config)
    }

    /// Instance over an explicit provider.
    pub fn with_provider(provider: Arc<dyn NativeProvider>, config: CryptoConfig) -> Self {
        let registry = Registry::new(provider.as_ref(), &config);
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Process-wide instance with the default configuration.
    pub fn global() -> &'static Crypto {
        &GLOBAL
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn symmetric(&self) -> SymmetricEngine<'_> {
        SymmetricEngine::new(self)
    }

    pub fn asymmetric(&self) -> AsymmetricEngine<'_> {
        AsymmetricEngine::new(self)
    }

    pub fn hash(&self) -> HashEngine<'_> {
        HashEngine::new(self)
    }

    pub fn mac(&self) -> MacEngine<'_> {
        MacEngine::new(self)
    }

    pub fn kdf(&self) -> KeyDerivationEngine<'_> {
        KeyDerivationEngine::new(self)
    }

    pub fn ecdh(&self) -> EcdhExchange<'_> {
        EcdhExchange::new(self)
    }

    pub fn random(&self) -> RandomEngine<'_> {
        RandomEngine::new(self)
    }

    pub(crate) fn provider(&self) -> &Arc<dyn NativeProvider> {
        &self.provider
    }

    /// Wraps a fresh native key in a portable handle.
    pub(crate) fn wrap_key(
        &self,
        descriptor: &'static AlgorithmDescriptor,
        native: Box<dyn NativeKey>,
    ) -> CryptographicKey {
        let private = native.has_private();
        let exportable = !private || self.config.allow_key_export();
        let usage = KeyUsage::for_algorithm(descriptor, private, exportable);
        tracing::debug!(algorithm = %descriptor.id(), bits = native.bits(), private, "key created");
        CryptographicKey::new(descriptor, Arc::clone(&self.provider), native, usage)
    }
}

impl std::fmt::Debug for Crypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crypto")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
