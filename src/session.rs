//! Per-caller login state.
//!
//! Each browser gets a random token in an HTTP-only cookie; the store maps
//! that token to the patron it logged in as. Callers without a cookie, or with
//! a token the store has forgotten, see the empty session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::types::CardNum;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
	pub name: String,
	pub card: Option<CardNum>,
}

impl Session {
	pub fn logged_in(name: impl Into<String>, card: CardNum) -> Self {
		Session { name: name.into(), card: Some(card) }
	}

	pub fn is_logged_in(&self) -> bool {
		self.card.is_some()
	}
}

#[derive(Clone)]
pub struct SessionStore {
	cookie: String,
	sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
	pub fn new(cookie: impl Into<String>) -> Self {
		SessionStore {
			cookie: cookie.into(),
			sessions: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	fn token(&self, cookies: &Cookies) -> Option<Uuid> {
		cookies.get(&self.cookie)
			.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
	}

	pub async fn get(&self, token: &Uuid) -> Session {
		self.sessions.lock().await
			.get(token)
			.cloned()
			.unwrap_or_default()
	}

	#[cfg(test)]
	pub async fn insert(&self, token: Uuid, session: Session) {
		self.sessions.lock().await.insert(token, session);
	}

	pub async fn remove(&self, token: &Uuid) -> Option<Session> {
		self.sessions.lock().await.remove(token)
	}

	/// The session the request's cookie points at, or the empty one.
	pub async fn current(&self, cookies: &Cookies) -> Session {
		match self.token(cookies) {
			Some(token) => self.get(&token).await,
			None => Session::default(),
		}
	}

	/// Records `session` under a fresh token and points the caller's cookie
	/// at it. Whatever token the caller brought along is forgotten.
	pub async fn login(&self, cookies: &Cookies, session: Session) {
		let token = Uuid::new_v4();
		{
			let mut sessions = self.sessions.lock().await;
			if let Some(previous) = self.token(cookies) {
				sessions.remove(&previous);
			}
			sessions.insert(token, session);
		}

		let cookie = Cookie::build((self.cookie.clone(), token.to_string()))
			.path("/")
			.http_only(true)
			.build();
		cookies.add(cookie);
	}

	pub async fn logout(&self, cookies: &Cookies) {
		if let Some(token) = self.token(cookies) {
			if let Some(session) = self.remove(&token).await {
				tracing::info!(name = %session.name, "Session cleared");
			}
		}
		let mut cookie = Cookie::new(self.cookie.clone(), "");
		cookie.set_path("/");
		cookies.remove(cookie);
	}
}
