//! Public-key handling for token delivery.
//!
//! Users register an RSA public key. Issued tokens are encrypted to that key
//! with RSA-OAEP (SHA-256) so only the holder of the private key can read
//! them. Keys are never used for signature verification.

use base64::Engine;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{spki, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

const SPKI_TAG: &str = "PUBLIC KEY";
const PKCS1_TAG: &str = "RSA PUBLIC KEY";

/// Longest plaintext the issuer encrypts: a hyphenated UUID.
pub const MAX_TOKEN_LEN: usize = 36;

/// OAEP-SHA256 padding: two digests plus two framing bytes.
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

/// Smallest modulus, in bytes, that fits one token under OAEP-SHA256.
pub const MIN_MODULUS_BYTES: usize = OAEP_SHA256_OVERHEAD + MAX_TOKEN_LEN;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid public key format: {0}")]
    InvalidKeyFormat(String),

    #[error("public key is not an RSA key")]
    UnsupportedKeyType,

    #[error("public key is too small: {bits} bits, need at least {min_bits}")]
    KeyTooSmall { bits: usize, min_bits: usize },
}

/// Decodes a PEM-encoded RSA public key.
///
/// Accepts SubjectPublicKeyInfo (`PUBLIC KEY`) and PKCS#1
/// (`RSA PUBLIC KEY`) blocks. A well-formed SPKI carrying a non-RSA
/// algorithm (Ed25519, EC, ...) is reported as `UnsupportedKeyType`, and a
/// modulus too short to carry a token as `KeyTooSmall`. Moduli above 4096
/// bits are refused by the `rsa` crate and surface as `InvalidKeyFormat`.
pub fn parse_public_key(public_key_pem: &str) -> Result<RsaPublicKey, KeyError> {
    let key = decode_pem(public_key_pem)?;
    if key.size() < MIN_MODULUS_BYTES {
        return Err(KeyError::KeyTooSmall {
            bits: key.n().bits(),
            min_bits: MIN_MODULUS_BYTES * 8,
        });
    }
    Ok(key)
}

fn decode_pem(public_key_pem: &str) -> Result<RsaPublicKey, KeyError> {
    let block = pem::parse(public_key_pem.trim()).map_err(|e| {
        KeyError::InvalidKeyFormat(format!("failed to decode PEM block: {}", e))
    })?;

    match block.tag() {
        SPKI_TAG => match RsaPublicKey::from_public_key_der(block.contents()) {
            Ok(key) => Ok(key),
            Err(spki::Error::OidUnknown { .. }) => Err(KeyError::UnsupportedKeyType),
            Err(e) => Err(KeyError::InvalidKeyFormat(format!(
                "failed to parse public key: {}",
                e
            ))),
        },
        PKCS1_TAG => RsaPublicKey::from_pkcs1_der(block.contents()).map_err(|e| {
            KeyError::InvalidKeyFormat(format!("failed to parse RSA public key: {}", e))
        }),
        other => Err(KeyError::InvalidKeyFormat(format!(
            "unexpected PEM block '{}'",
            other
        ))),
    }
}

/// Encrypts `token` for `public_key` and returns standard base64.
///
/// OAEP padding is randomized: encrypting the same token twice yields
/// different ciphertexts.
pub fn encrypt_token(token: &str, public_key: &RsaPublicKey) -> Result<String, rsa::Error> {
    let mut rng = rand::thread_rng();
    let ciphertext = public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), token.as_bytes())?;
    Ok(base64::engine::general_purpose::STANDARD.encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    // RFC 8410 §10.1 example Ed25519 public key.
    const ED25519_PEM: &str = "-----BEGIN PUBLIC KEY-----\n\
MCowBQYDK2VwAyEAGb9ECWmEzf6FQbrBZ9w7lshQhqowtrbLDFw4rXAxZuE=\n\
-----END PUBLIC KEY-----\n";

    fn keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let public = RsaPublicKey::from(&private);
        (private, public)
    }

    #[test]
    fn test_encrypt_roundtrip() {
        let (private, public) = keypair();
        let pem = public.to_public_key_pem(LineEnding::LF).unwrap();
        let parsed = parse_public_key(&pem).unwrap();

        let token = "5f0c3c55-8d0e-4a51-9a4e-0d3b8f1c2a77";
        let encoded = encrypt_token(token, &parsed).unwrap();

        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let plaintext = private.decrypt(Oaep::new::<Sha256>(), &ciphertext).unwrap();
        assert_eq!(plaintext, token.as_bytes());
    }

    #[test]
    fn test_encryption_is_randomized() {
        let (_, public) = keypair();
        let a = encrypt_token("same-token", &public).unwrap();
        let b = encrypt_token("same-token", &public).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pkcs1_pem_accepted() {
        let (_, public) = keypair();
        let pem = public.to_pkcs1_pem(LineEnding::LF).unwrap();
        assert_eq!(parse_public_key(&pem).unwrap(), public);
    }

    #[test]
    fn test_missing_pem_block() {
        let err = parse_public_key("definitely not a key").unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));

        let err = parse_public_key("").unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));
    }

    #[test]
    fn test_garbage_der_inside_pem() {
        let pem = "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
        let err = parse_public_key(pem).unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyFormat(_)));
    }

    #[test]
    fn test_key_too_small_for_a_token() {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 512).unwrap();
        let pem = RsaPublicKey::from(&private)
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let err = parse_public_key(&pem).unwrap_err();
        assert!(matches!(
            err,
            KeyError::KeyTooSmall { bits: 512, min_bits: 816 }
        ));
    }

    #[test]
    fn test_smallest_accepted_key_fits_a_token() {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, MIN_MODULUS_BYTES * 8).unwrap();
        let pem = RsaPublicKey::from(&private)
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let public = parse_public_key(&pem).unwrap();
        let token = "x".repeat(MAX_TOKEN_LEN);
        assert!(encrypt_token(&token, &public).is_ok());
    }

    #[test]
    fn test_non_rsa_key_rejected() {
        let err = parse_public_key(ED25519_PEM).unwrap_err();
        assert!(matches!(err, KeyError::UnsupportedKeyType));
    }
}
