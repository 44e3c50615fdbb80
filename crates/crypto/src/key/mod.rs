// Copyright (C) Microsoft Corporation. All rights reserved.

//! Portable key handle.
//!
//! A [`CryptographicKey`] wraps a provider key handle together with the
//! algorithm it was created for and the operations it permits. Clones share
//! one handle; releasing through any clone releases it for all of them.

mod bcrypt;
mod blob;

use parking_lot::MappedRwLockReadGuard;
use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;
use parking_lot::RwLockUpgradableReadGuard;

pub(crate) use bcrypt::*;
pub use blob::*;

use super::*;

/// Operations a key permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyUsage {
    pub encrypt: bool,
    pub decrypt: bool,
    pub sign: bool,
    pub verify: bool,
    pub derive: bool,
    pub export: bool,
}

/// Capability checked before an operation reaches the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyCapability {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    Derive,
    Export,
}

impl KeyUsage {
    pub(crate) fn permits(&self, capability: KeyCapability) -> bool {
        match capability {
            KeyCapability::Encrypt => self.encrypt,
            KeyCapability::Decrypt => self.decrypt,
            KeyCapability::Sign => self.sign,
            KeyCapability::Verify => self.verify,
            KeyCapability::Derive => self.derive,
            KeyCapability::Export => self.export,
        }
    }

    /// Usage of a freshly generated or imported key.
    ///
    /// `private` is false for public-only keys, which keep only the
    /// operations that need the public half.
    pub(crate) fn for_algorithm(
        descriptor: &AlgorithmDescriptor,
        private: bool,
        exportable: bool,
    ) -> Self {
        let mut usage = KeyUsage {
            export: exportable,
            ..KeyUsage::default()
        };
        match descriptor.category() {
            AlgorithmCategory::Symmetric => {
                usage.encrypt = true;
                usage.decrypt = true;
            }
            AlgorithmCategory::Mac => {
                usage.sign = true;
                usage.verify = true;
            }
            AlgorithmCategory::Asymmetric if descriptor.is_signature() => {
                usage.sign = private;
                usage.verify = true;
            }
            AlgorithmCategory::Asymmetric => {
                usage.encrypt = true;
                usage.decrypt = private;
            }
            AlgorithmCategory::KeyAgreement => usage.derive = true,
            AlgorithmCategory::Hash | AlgorithmCategory::KeyDerivation => {}
        }
        usage
    }
}

struct KeyInner {
    descriptor: &'static AlgorithmDescriptor,
    provider: Arc<dyn NativeProvider>,
    usage: KeyUsage,
    bits: usize,
    native: Option<Box<dyn NativeKey>>,
    public_view: Option<CryptographicKey>,
}

impl KeyInner {
    fn release(&mut self) {
        if let Some(native) = self.native.take() {
            tracing::debug!(algorithm = %self.descriptor.id(), "releasing native key handle");
            drop(native);
        }
        self.public_view = None;
    }
}

impl Drop for KeyInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// Shared, releasable key handle.
#[derive(Clone)]
pub struct CryptographicKey {
    inner: Arc<RwLock<KeyInner>>,
}

/// Read access to a live native handle.
pub(crate) struct LiveKey<'a> {
    native: MappedRwLockReadGuard<'a, dyn NativeKey>,
    descriptor: &'static AlgorithmDescriptor,
    provider: Arc<dyn NativeProvider>,
    usage: KeyUsage,
    bits: usize,
}

impl LiveKey<'_> {
    pub(crate) fn native(&self) -> &dyn NativeKey {
        &*self.native
    }

    pub(crate) fn descriptor(&self) -> &'static AlgorithmDescriptor {
        self.descriptor
    }

    pub(crate) fn provider(&self) -> &Arc<dyn NativeProvider> {
        &self.provider
    }

    pub(crate) fn bits(&self) -> usize {
        self.bits
    }
}

impl CryptographicKey {
    pub(crate) fn new(
        descriptor: &'static AlgorithmDescriptor,
        provider: Arc<dyn NativeProvider>,
        native: Box<dyn NativeKey>,
        usage: KeyUsage,
    ) -> Self {
        let bits = native.bits();
        Self {
            inner: Arc::new(RwLock::new(KeyInner {
                descriptor,
                provider,
                usage,
                bits,
                native: Some(native),
                public_view: None,
            })),
        }
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.inner.read_recursive().descriptor.id()
    }

    pub fn descriptor(&self) -> &'static AlgorithmDescriptor {
        self.inner.read_recursive().descriptor
    }

    /// Key size in bits.
    pub fn key_size(&self) -> usize {
        self.inner.read_recursive().bits
    }

    pub fn usage(&self) -> KeyUsage {
        self.inner.read_recursive().usage
    }

    pub fn is_released(&self) -> bool {
        self.inner.read_recursive().native.is_none()
    }

    /// Whether private (or secret) material is present.
    pub fn has_private_key(&self) -> CryptoResult<bool> {
        Ok(self.live()?.native().has_private())
    }

    /// Whether both handles refer to the same underlying key.
    pub fn same_handle(&self, other: &CryptographicKey) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Frees the native handle. Idempotent; later operations on this key
    /// (or any clone of it) fail with [`CryptoError::InvalidState`].
    pub fn release(&self) {
        self.inner.write().release();
    }

    /// Recursive so one thread may hold several views of the same key (ECDH
    /// of a key with itself) while a release is waiting.
    pub(crate) fn live(&self) -> CryptoResult<LiveKey<'_>> {
        let guard = self.inner.read_recursive();
        let descriptor = guard.descriptor;
        let provider = Arc::clone(&guard.provider);
        let usage = guard.usage;
        let bits = guard.bits;
        let native = RwLockReadGuard::try_map(guard, |inner| inner.native.as_deref())
            .map_err(|_| CryptoError::InvalidState)?;
        Ok(LiveKey {
            native,
            descriptor,
            provider,
            usage,
            bits,
        })
    }

    /// Live handle that also permits `capability`.
    pub(crate) fn live_for(&self, capability: KeyCapability) -> CryptoResult<LiveKey<'_>> {
        let live = self.live()?;
        if !live.usage.permits(capability) {
            tracing::debug!(
                algorithm = %live.descriptor().id(),
                ?capability,
                "key usage does not permit operation"
            );
            Err(CryptoError::InvalidKeyUsage)?;
        }
        Ok(live)
    }

    /// Public half of an asymmetric key.
    ///
    /// Derived once and cached; the cache is dropped by
    /// [`AsymmetricEngine::set_key_size`] and [`CryptographicKey::release`].
    pub fn public_key(&self) -> CryptoResult<CryptographicKey> {
        let guard = self.inner.upgradable_read();
        let native = guard.native.as_deref().ok_or(CryptoError::InvalidState)?;

        if !(guard.descriptor.is_rsa() || guard.descriptor.is_ecc()) {
            Err(CryptoError::InvalidParameter)?;
        }
        if !native.has_private() {
            return Ok(self.clone());
        }
        if let Some(public) = &guard.public_view {
            return Ok(public.clone());
        }

        let public_native = guard.provider.public_key(native)?;
        let usage = KeyUsage::for_algorithm(guard.descriptor, false, true);
        let public = CryptographicKey::new(
            guard.descriptor,
            Arc::clone(&guard.provider),
            public_native,
            usage,
        );

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.public_view = Some(public.clone());
        Ok(public)
    }

    /// Encodes the public half of the key.
    ///
    /// Fails with [`CryptoError::NotExportable`] for keys without a public
    /// component.
    pub fn export_public_key(&self, format: PublicKeyBlobFormat) -> CryptoResult<PublicKeyBlob> {
        let live = self.live()?;
        let descriptor = live.descriptor();
        if !(descriptor.is_rsa() || descriptor.is_ecc()) {
            Err(CryptoError::NotExportable)?;
        }
        if !format.fits(descriptor) {
            Err(CryptoError::InvalidParameter)?;
        }
        let bytes = live
            .provider()
            .export_public_key(descriptor, live.native(), format)?;
        Ok(PublicKeyBlob::new(format, bytes))
    }

    /// Encodes the private key. Requires an exportable key pair.
    pub fn export_private_key(
        &self,
        format: PrivateKeyBlobFormat,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let live = self.live()?;
        let descriptor = live.descriptor();
        if !live.usage.export || !live.native().has_private() {
            Err(CryptoError::NotExportable)?;
        }
        if !format.fits(descriptor) {
            Err(CryptoError::InvalidParameter)?;
        }
        Ok(live.provider().export_private_key(live.native(), format)?)
    }

    /// Raw secret material of a symmetric or MAC key.
    pub fn export_raw(&self) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let live = self.live_for(KeyCapability::Export)?;
        if !matches!(
            live.descriptor().category(),
            AlgorithmCategory::Symmetric | AlgorithmCategory::Mac
        ) {
            Err(CryptoError::NotExportable)?;
        }
        Ok(live.provider().export_secret(live.native())?)
    }

    /// Replaces the key pair with a freshly generated one of `bits`.
    ///
    /// Only generated key pairs may be resized. The cached public view is
    /// invalidated; clones observe the new key.
    pub(crate) fn set_key_size(&self, bits: usize, config: &CryptoConfig) -> CryptoResult<()> {
        let mut guard = self.inner.write();
        let native = guard.native.as_deref().ok_or(CryptoError::InvalidState)?;
        let descriptor = guard.descriptor;

        if !(descriptor.is_rsa() || descriptor.is_ecc()) || !native.has_private() {
            Err(CryptoError::InvalidParameter)?;
        }
        config.check_key_bits(descriptor, bits)?;
        if bits == guard.bits {
            return Ok(());
        }

        let replacement = guard.provider.generate_key_pair(descriptor, bits)?;
        tracing::debug!(algorithm = %descriptor.id(), from = guard.bits, to = bits, "key pair regenerated");

        guard.bits = replacement.bits();
        guard.native = Some(replacement);
        guard.public_view = None;
        Ok(())
    }
}

impl std::fmt::Debug for CryptographicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read_recursive();
        f.debug_struct("CryptographicKey")
            .field("algorithm", &inner.descriptor.id())
            .field("bits", &inner.bits)
            .field("usage", &inner.usage)
            .field("released", &inner.native.is_none())
            .finish()
    }
}
