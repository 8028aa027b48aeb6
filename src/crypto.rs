//! Identity and cryptographic primitives.
//!
//! Reference: spec.md Section 4.1 (Identity & Crypto primitives)
//!
//! An `Address` is a 20-byte identifier derived from a public key. Keys are
//! secp256k1 (via `k256`); signatures are plain 64-byte ECDSA `r || s`
//! values, not recoverable ones — the signer's public key always travels
//! alongside the signature in the frame header, so recovery is unneeded.

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Errors from key construction and signature verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid private key bytes")]
    InvalidPrivateKey,
    #[error("invalid public key bytes")]
    InvalidPublicKey,
    #[error("invalid signature bytes")]
    InvalidSignature,
    #[error("signature verification failed")]
    VerificationFailed,
}

/// A 20-byte node identifier derived from the last 20 bytes of
/// `SHA-256(compressed_public_key)`.
///
/// Reference: spec.md Section 3 (Address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive the address that corresponds to a public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = Sha256::digest(public_key.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..32]);
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; 20])
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Parse a compressed SEC1 public key.
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Verify a signature produced over `message`.
    pub fn verify(&self, message: &[u8], signature: &SignatureBytes) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = Signature::from_slice(&signature.0).map_err(|_| CryptoError::InvalidSignature)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }
}

/// A 64-byte ECDSA `r || s` signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureBytes(pub [u8; 64]);

impl SignatureBytes {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// secp256k1 keypair. Zeroizes its secret scalar on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Reconstruct a keypair from its 32-byte secret scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// The compressed public key (33 bytes).
    pub fn public_key(&self) -> PublicKey {
        let verifying_key = self.signing_key.verifying_key();
        let sec1_bytes = verifying_key.to_sec1_bytes();
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&sec1_bytes[..33]);
        PublicKey(bytes)
    }

    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign `message` with a deterministic (RFC 6979) ECDSA signature.
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        let sig: Signature = self.signing_key.sign(message);
        let bytes: [u8; 64] = sig.to_bytes().into();
        SignatureBytes(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let keypair = KeyPair::generate();
        let message = b"hello peer";
        let sig = keypair.sign(message);
        assert!(keypair.public_key().verify(message, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let keypair = KeyPair::generate();
        let sig = keypair.sign(b"message one");
        assert!(keypair.public_key().verify(b"message two", &sig).is_err());
    }

    #[test]
    fn signatures_are_deterministic() {
        let keypair = KeyPair::from_bytes([0xABu8; 32]).unwrap();
        let sig1 = keypair.sign(b"deterministic");
        let sig2 = keypair.sign(b"deterministic");
        assert_eq!(sig1.as_bytes(), sig2.as_bytes());
    }

    #[test]
    fn address_is_deterministic_and_20_bytes() {
        let keypair = KeyPair::generate();
        let addr1 = keypair.address();
        let addr2 = keypair.address();
        assert_eq!(addr1, addr2);
        assert_eq!(addr1.as_bytes().len(), 20);
    }

    #[test]
    fn roundtrip_private_key_bytes() {
        let original = KeyPair::generate();
        let bytes = original.to_bytes();
        let restored = KeyPair::from_bytes(bytes).unwrap();
        assert_eq!(original.public_key(), restored.public_key());
    }
}
