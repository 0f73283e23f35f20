use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use crate::config::JwtConfig;

/// The claims of a bearer token: who it is for and when it is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthJwtPayload {
	pub user_id: i64,
	pub issued_at: DateTime<Utc>,
	pub expiration: Option<DateTime<Utc>>,
}

impl AuthJwtPayload {
	/// A payload issued now, expiring after the configured lifetime.
	pub fn new(config: &JwtConfig, user_id: i64) -> Self {
		let issued_at = Utc::now();
		let expiration = config
			.token_lifetime()
			.and_then(|lifetime| chrono::Duration::from_std(lifetime).ok())
			.map(|lifetime| issued_at + lifetime);

		Self {
			user_id,
			issued_at,
			expiration,
		}
	}

	pub fn serialize(&self, config: &JwtConfig) -> Option<String> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;

		let claims = Claims::new(RegisteredClaims {
			issuer: Some(config.issuer.clone()),
			subject: Some(self.user_id.to_string()),
			audience: None,
			expiration: self.expiration.map(|exp| exp.timestamp() as u64),
			not_before: None,
			issued_at: Some(self.issued_at.timestamp() as u64),
			json_web_token_id: None,
		});

		claims.sign_with_key(&key).ok()
	}

	pub fn verify(config: &JwtConfig, token: &str) -> Option<Self> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return None;
		}

		let now = Utc::now();

		let iat = Utc.timestamp_opt(claims.registered.issued_at? as i64, 0).single()?;
		if iat > now {
			return None;
		}

		let nbf = claims
			.registered
			.not_before
			.and_then(|nbf| Utc.timestamp_opt(nbf as i64, 0).single());
		if nbf.is_some_and(|nbf| nbf > now) {
			return None;
		}

		let exp = claims
			.registered
			.expiration
			.and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single());
		if exp.is_some_and(|exp| exp < now) {
			return None;
		}

		let user_id = claims.registered.subject.as_ref()?.parse::<i64>().ok()?;

		Some(Self {
			user_id,
			issued_at: iat,
			expiration: exp,
		})
	}
}
