//! Admin gate in front of the moderation endpoints.
//!
//! Handlers take an `AdminIdentity` argument; extracting it asks the
//! `AdminGate` registered in app data to verify the request. The comment
//! pipeline only ever sees the resulting identity.

use crate::error::ModerationError;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web::Data, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::sync::Arc;

/// Verified admin caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminIdentity {
    pub name: String,
}

/// Authenticates admin requests.
pub trait AdminGate: Send + Sync {
    fn verify(&self, req: &HttpRequest) -> Option<AdminIdentity>;
}

/// Accepts `Authorization: Bearer <token>` matching the configured secret.
///
/// Only the blake3 digest of the secret is kept. Digests are compared with
/// `blake3::Hash`'s constant-time equality.
pub struct TokenGate {
    digest: Option<blake3::Hash>,
}

impl TokenGate {
    /// An empty token produces a gate that denies everyone.
    pub fn new(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            log::warn!("No admin API token configured; admin endpoints are disabled");
            return Self { digest: None };
        }
        Self {
            digest: Some(blake3::hash(token.as_bytes())),
        }
    }

    fn bearer(req: &HttpRequest) -> Option<&str> {
        req.headers()
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::trim)
    }
}

impl AdminGate for TokenGate {
    fn verify(&self, req: &HttpRequest) -> Option<AdminIdentity> {
        let expected = self.digest.as_ref()?;
        let presented = Self::bearer(req)?;

        if blake3::hash(presented.as_bytes()) == *expected {
            Some(AdminIdentity {
                name: "admin".to_string(),
            })
        } else {
            None
        }
    }
}

impl FromRequest for AdminIdentity {
    type Error = ModerationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let gate = match req.app_data::<Data<Arc<dyn AdminGate>>>() {
            Some(gate) => gate,
            None => {
                log::error!("AdminGate missing from app data; refusing admin request");
                return ready(Err(ModerationError::Unauthorized));
            }
        };

        match gate.verify(req) {
            Some(identity) => ready(Ok(identity)),
            None => {
                log::warn!("Rejected admin request to {}", req.path());
                ready(Err(ModerationError::Unauthorized))
            }
        }
    }
}
