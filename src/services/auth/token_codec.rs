//! HS512 access tokens: issue, verify, and read the subject back out.
//!
//! The payload carries only `sub`, `iat` and `exp`. Roles are never trusted
//! from the token; the request filter resolves them through `CredentialLookup`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MIN_JWT_SECRET_BYTES;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must be at least {MIN_JWT_SECRET_BYTES} bytes")]
    WeakSecret,
    #[error("token validity must be a positive number of seconds")]
    InvalidValidity,
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

// Only the subject is needed when reading an unverified payload.
#[derive(Deserialize)]
struct SubjectOnly {
    sub: String,
}

/// Stateless after construction; share it behind an `Arc`.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validity", &self.validity)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], validity_seconds: u64) -> Result<Self, TokenError> {
        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(TokenError::WeakSecret);
        }

        let validity = i64::try_from(validity_seconds)
            .ok()
            .filter(|s| *s > 0)
            .and_then(Duration::try_seconds)
            .ok_or(TokenError::InvalidValidity)?;

        // Expiry is checked by hand against `now` so the window is half-open.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity,
        })
    }

    pub fn generate_token(&self, subject: &str) -> Result<String, TokenError> {
        self.generate_token_at(subject, Utc::now())
    }

    /// Issue a token whose validity window starts at `issued_at`.
    pub fn generate_token_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.validity)
            .ok_or(TokenError::InvalidValidity)?;
        self.sign(subject, issued_at, expires_at)
    }

    fn sign(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(Algorithm::HS512);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    /// `true` only for a well-formed token with a matching signature that has
    /// not yet expired. Every failure collapses to `false`.
    pub fn validate_token(&self, token: &str) -> bool {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.verify_at(token, now) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "access token rejected");
                false
            }
        }
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AccessTokenClaims, TokenError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        // valid for [iat, exp)
        let now = now.timestamp();
        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        if now < data.claims.iat {
            return Err(TokenError::NotYetValid);
        }

        Ok(data.claims)
    }

    /// Read `sub` from the payload without checking signature or expiry.
    ///
    /// Callers must run `validate_token` before trusting the result.
    pub fn username_from_token(&self, token: &str) -> Result<String, TokenError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: SubjectOnly =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

        Ok(claims.sub)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_SECRET: &[u8] =
        b"LoremIpsumDolorSitAmetConsecteturAdipiscingElitSedDoEiusmodTemporIncididuntUtLaboreEtDoloreMagnaAliqua";

    pub(crate) fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, 86_400).unwrap()
    }

    // Replace the char at `idx` with a different base64url char.
    fn mutate_at(token: &str, idx: usize) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn generated_token_has_three_segments() {
        let token = codec().generate_token("testuser").unwrap();
        assert!(!token.is_empty());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn generated_token_validates() {
        let codec = codec();
        let token = codec.generate_token("usuario_valido").unwrap();
        assert!(codec.validate_token(&token));
    }

    #[test]
    fn username_round_trips() {
        let codec = codec();
        let token = codec.generate_token("yasmin123").unwrap();
        assert_eq!(codec.username_from_token(&token).unwrap(), "yasmin123");
    }

    #[test]
    fn different_instants_give_different_tokens() {
        let codec = codec();
        let now = Utc::now();
        let a = codec.generate_token_at("yasmin", now).unwrap();
        let b = codec
            .generate_token_at("yasmin", now + Duration::seconds(1))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_subject_is_rejected() {
        assert!(matches!(
            codec().generate_token("  "),
            Err(TokenError::EmptySubject)
        ));
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            TokenCodec::new(b"short", 60),
            Err(TokenError::WeakSecret)
        ));
    }

    #[test]
    fn zero_validity_is_rejected() {
        assert!(matches!(
            TokenCodec::new(TEST_SECRET, 0),
            Err(TokenError::InvalidValidity)
        ));
    }

    #[test]
    fn appended_garbage_fails() {
        let codec = codec();
        let token = codec.generate_token("user").unwrap();
        assert!(!codec.validate_token(&format!("{token}ruim")));
    }

    #[test]
    fn every_signature_mutation_fails() {
        let codec = codec();
        let token = codec.generate_token("user").unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for idx in sig_start..token.len() {
            assert!(
                !codec.validate_token(&mutate_at(&token, idx)),
                "signature mutation at {idx} accepted"
            );
        }
    }

    #[test]
    fn every_payload_mutation_fails() {
        let codec = codec();
        let token = codec.generate_token("user").unwrap();
        let payload_start = token.find('.').unwrap() + 1;
        let payload_end = token.rfind('.').unwrap();

        for idx in payload_start..payload_end {
            assert!(
                !codec.validate_token(&mutate_at(&token, idx)),
                "payload mutation at {idx} accepted"
            );
        }
    }

    #[test]
    fn foreign_secret_fails() {
        let other =
            TokenCodec::new(b"another-secret-that-is-definitely-long-enough-for-hs512-signing!!", 60)
                .unwrap();
        let token = other.generate_token("user").unwrap();
        assert!(!codec().validate_token(&token));
    }

    #[test]
    fn expired_token_fails() {
        let codec = codec();
        let now = Utc::now();
        let token = codec
            .sign(
                "usuario_velho",
                now - Duration::milliseconds(1_000_000),
                now - Duration::milliseconds(500_000),
            )
            .unwrap();

        assert!(!codec.validate_token(&token));
        // still decodable; the filter is the one that discards it
        assert_eq!(codec.username_from_token(&token).unwrap(), "usuario_velho");
    }

    #[test]
    fn expiry_bound_is_exclusive() {
        let codec = TokenCodec::new(TEST_SECRET, 60).unwrap();
        let issued_at = Utc::now() - Duration::seconds(30);
        let token = codec.generate_token_at("user", issued_at).unwrap();

        assert!(codec.validate_token_at(&token, issued_at));
        assert!(codec.validate_token_at(&token, issued_at + Duration::seconds(59)));
        assert!(!codec.validate_token_at(&token, issued_at + Duration::seconds(60)));
    }

    #[test]
    fn malformed_input_is_false_not_panic() {
        let codec = codec();
        for input in ["", ".", "..", "a.b", "a.b.c", "a.b.c.d", "not a token", "Bearer x"] {
            assert!(!codec.validate_token(input), "{input:?} accepted");
        }
    }

    #[test]
    fn username_from_malformed_token_errors() {
        let codec = codec();
        assert!(matches!(
            codec.username_from_token("a.b"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            codec.username_from_token("a.!!!.c"),
            Err(TokenError::Malformed)
        ));
        // valid base64url but not JSON
        assert!(matches!(
            codec.username_from_token("a.aGVsbG8.c"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn username_survives_signature_tampering() {
        let codec = codec();
        let token = codec.generate_token("yasmin").unwrap();
        let tampered = mutate_at(&token, token.len() - 5);
        assert!(!codec.validate_token(&tampered));
        assert_eq!(codec.username_from_token(&tampered).unwrap(), "yasmin");
    }
}
