// storefront/src/session.rs

//! Maps an inbound request to the session that owns its cart.
//!
//! The id travels in a cookie. A request without a usable cookie gets a fresh
//! id, and `issue_session_cookie` writes it back on the response. The resolved
//! id is cached in the request extensions so every lookup within one request
//! sees the same value.

use actix_web::body::MessageBody;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use std::fmt;

use crate::config::SESSION_MAX_AGE_DAYS_RANGE;
use crate::errors::AppError;
use crate::state::AppState;

const SESSION_PREFIX: &str = "cs_";
const MIN_SESSION_LEN: usize = 16;
const MAX_SESSION_LEN: usize = 128;
const FALLBACK_COOKIE_NAME: &str = "cart_session";

/// Opaque per-visitor identity keying a cart. Not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
  /// 32 bytes from the OS RNG, hex encoded.
  pub fn generate() -> Self {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    Self(format!("{}{}", SESSION_PREFIX, hex))
  }

  /// Accepts 16-128 chars of `[A-Za-z0-9_-]`; anything else is treated as no session.
  pub fn parse(raw: &str) -> Option<Self> {
    let well_formed = (MIN_SESSION_LEN..=MAX_SESSION_LEN).contains(&raw.len())
      && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    well_formed.then(|| Self(raw.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Leading characters only, for log lines.
  pub fn short(&self) -> &str {
    let end = self.0.len().min(SESSION_PREFIX.len() + 8);
    &self.0[..end]
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The session resolved for the current request.
#[derive(Debug, Clone)]
pub struct CartSession {
  pub id: SessionId,
  /// Minted during this request; the response must carry a `Set-Cookie`.
  pub is_new: bool,
}

#[derive(Clone)]
struct ResolvedSession(CartSession);

fn cookie_name_for(req: &HttpRequest) -> String {
  req
    .app_data::<web::Data<AppState>>()
    .map(|state| state.config.session_cookie_name.clone())
    .unwrap_or_else(|| FALLBACK_COOKIE_NAME.to_string())
}

/// Returns the request's session, minting one if the cookie is absent or malformed.
pub fn get_or_create_session_id(req: &HttpRequest) -> CartSession {
  if let Some(resolved) = req.extensions().get::<ResolvedSession>() {
    return resolved.0.clone();
  }

  let cookie_name = cookie_name_for(req);
  let session = match req.cookie(&cookie_name).and_then(|c| SessionId::parse(c.value())) {
    Some(id) => CartSession { id, is_new: false },
    None => {
      let id = SessionId::generate();
      tracing::debug!(session = %id.short(), "Minted new cart session.");
      CartSession { id, is_new: true }
    }
  };

  req.extensions_mut().insert(ResolvedSession(session.clone()));
  session
}

impl FromRequest for CartSession {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(Ok(get_or_create_session_id(req)))
  }
}

fn build_session_cookie(req: &HttpRequest, id: &SessionId) -> Cookie<'static> {
  let (name, secure, max_age_days) = match req.app_data::<web::Data<AppState>>() {
    Some(state) => (
      state.config.session_cookie_name.clone(),
      state.config.session_cookie_secure,
      state.config.session_max_age_days,
    ),
    None => (FALLBACK_COOKIE_NAME.to_string(), false, 30),
  };

  Cookie::build(name, id.as_str().to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(secure)
    .max_age(CookieDuration::days(max_age_days.clamp(
      *SESSION_MAX_AGE_DAYS_RANGE.start(),
      *SESSION_MAX_AGE_DAYS_RANGE.end(),
    )))
    .finish()
}

/// Middleware that persists a session minted while handling the request.
pub async fn issue_session_cookie(
  req: ServiceRequest,
  next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
  let mut res = next.call(req).await?;

  let minted = res
    .request()
    .extensions()
    .get::<ResolvedSession>()
    .filter(|s| s.0.is_new)
    .map(|s| s.0.id.clone());

  if let Some(id) = minted {
    let cookie = build_session_cookie(res.request(), &id);
    res
      .response_mut()
      .add_cookie(&cookie)
      .map_err(actix_web::error::ErrorInternalServerError)?;
  }
  Ok(res)
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn generated_ids_are_unique_and_well_formed() {
    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with(SESSION_PREFIX));
    assert_eq!(SessionId::parse(a.as_str()), Some(a.clone()));
    assert_eq!(a.short().len(), SESSION_PREFIX.len() + 8);
  }

  #[test]
  fn rejects_malformed_tokens() {
    assert!(SessionId::parse("").is_none());
    assert!(SessionId::parse("short").is_none());
    assert!(SessionId::parse("has spaces in it, definitely").is_none());
    assert!(SessionId::parse(&"a".repeat(MAX_SESSION_LEN + 1)).is_none());
    assert!(SessionId::parse("legacy-session_0123456789").is_some());
  }

  #[test]
  fn reuses_cookie_session() {
    let req = TestRequest::default()
      .cookie(Cookie::new(FALLBACK_COOKIE_NAME, "cs_existing_visitor_token"))
      .to_http_request();
    let session = get_or_create_session_id(&req);
    assert!(!session.is_new);
    assert_eq!(session.id.as_str(), "cs_existing_visitor_token");
  }

  #[test]
  fn resolution_is_stable_within_one_request() {
    let req = TestRequest::default().to_http_request();
    let first = get_or_create_session_id(&req);
    let second = get_or_create_session_id(&req);
    assert!(first.is_new);
    assert_eq!(first.id, second.id);
  }

  fn request_with_max_age(days: i64) -> HttpRequest {
    use crate::config::AppConfig;
    use crate::services::catalog::InMemoryCatalog;
    use crate::services::notifier::LogNotifier;
    use crate::services::orders::InMemoryOrderStore;
    use crate::store::InMemoryCartStore;
    use std::sync::Arc;

    let config = AppConfig {
      session_max_age_days: days,
      ..AppConfig::default()
    };
    let catalog = Arc::new(InMemoryCatalog::new());
    let state = AppState::new(
      config,
      Arc::new(InMemoryCartStore::new(catalog.clone(), 10)),
      catalog,
      Arc::new(InMemoryOrderStore::new()),
      Arc::new(LogNotifier::default()),
    );
    TestRequest::default().app_data(web::Data::new(state)).to_http_request()
  }

  #[test]
  fn cookie_max_age_stays_in_range() {
    let id = SessionId::generate();

    let cookie = build_session_cookie(&request_with_max_age(30), &id);
    assert_eq!(cookie.max_age(), Some(CookieDuration::days(30)));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.value(), id.as_str());

    let cookie = build_session_cookie(&request_with_max_age(i64::MAX), &id);
    assert_eq!(cookie.max_age(), Some(CookieDuration::days(3650)));

    let cookie = build_session_cookie(&request_with_max_age(-5), &id);
    assert_eq!(cookie.max_age(), Some(CookieDuration::days(1)));
  }

  #[test]
  fn malformed_cookie_gets_replaced() {
    let req = TestRequest::default()
      .cookie(Cookie::new(FALLBACK_COOKIE_NAME, "x"))
      .to_http_request();
    let session = get_or_create_session_id(&req);
    assert!(session.is_new);
    assert_ne!(session.id.as_str(), "x");
  }
}
