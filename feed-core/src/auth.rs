//! Signed access tokens and the static credential table.
//!
//! Tokens are stateless HS256 JWS strings over `{sub, iat}`. Validity is
//! entirely determined by the signature and the token's age at
//! verification time; nothing is stored server-side. Rotating the secret
//! invalidates all outstanding tokens, and an issued token cannot be
//! revoked before its validity window elapses.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity the token was issued to.
    pub sub: String,
    /// Issuance time, unix seconds.
    pub iat: u64,
}

/// Why verification rejected a token.
///
/// Callers report every variant as the same externally visible
/// "unauthenticated" outcome; the distinction exists for diagnostics.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    Signature,
    #[error("token issued more than {0:?} ago")]
    Expired(Duration),
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies signed, time-limited identity tokens.
pub struct AccessGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl AccessGate {
    pub fn new(secret: &str, validity: Duration) -> Self {
        // `exp` is deliberately not a claim: the validity window is
        // checked against `iat` at verification time, so a reconfigured
        // window applies to tokens already in flight.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for an identity whose credentials the caller has
    /// already checked.
    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, now_unix())
    }

    fn issue_at(&self, identity: &str, iat: u64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: identity.to_string(),
            iat,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return the embedded identity.
    ///
    /// Never panics; a bad token of any kind comes back as an error the
    /// caller maps to a rejection response.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::Signature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        let age = Duration::from_secs(now_unix().saturating_sub(data.claims.iat));
        if age > self.validity {
            return Err(TokenError::Expired(self.validity));
        }

        Ok(data.claims.sub)
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}

/// Static identity-to-secret table, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn from_pairs<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: pairs
                .into_iter()
                .map(|(user, pass)| (user.into(), pass.into()))
                .collect(),
        }
    }

    /// Check a username/password pair against the table.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AccessGate {
        AccessGate::new("unit-test-secret", Duration::from_secs(300))
    }

    #[test]
    fn test_verify_roundtrip_returns_identity() {
        let gate = gate();
        let token = gate.issue("testUser").unwrap();
        assert_eq!(gate.verify(&token).unwrap(), "testUser");
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let gate = gate();
        let token = gate.issue("testUser").unwrap();

        // Alter one character of the signature segment, keeping it valid
        // base64url so the failure is the signature check itself.
        let dot = token.rfind('.').unwrap();
        let mut tampered: Vec<u8> = token.into_bytes();
        let target = dot + 1 + (tampered.len() - dot - 1) / 2;
        tampered[target] = if tampered[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            gate.verify(&tampered),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let gate = gate();
        let other = AccessGate::new("some-other-secret", Duration::from_secs(300));
        let token = other.issue("testUser").unwrap();
        assert!(matches!(gate.verify(&token), Err(TokenError::Signature)));
    }

    #[test]
    fn test_token_older_than_window_is_expired() {
        let gate = AccessGate::new("unit-test-secret", Duration::from_secs(60));
        let token = gate.issue_at("testUser", now_unix() - 120).unwrap();
        assert!(matches!(gate.verify(&token), Err(TokenError::Expired(_))));
    }

    #[test]
    fn test_token_near_window_edge_is_still_valid() {
        // One second of slack keeps the wall clock from flaking the test.
        let gate = AccessGate::new("unit-test-secret", Duration::from_secs(60));
        let token = gate.issue_at("testUser", now_unix() - 59).unwrap();
        assert_eq!(gate.verify(&token).unwrap(), "testUser");
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let gate = gate();
        assert!(matches!(
            gate.verify("not-a-token"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_credential_store_authentication() {
        let store = CredentialStore::from_pairs([("testUser", "testPass")]);
        assert!(store.authenticate("testUser", "testPass"));
        assert!(!store.authenticate("testUser", "wrong"));
        assert!(!store.authenticate("nobody", "testPass"));
    }
}
