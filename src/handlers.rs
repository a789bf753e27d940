//! HTTP surface: the JSON actions under `/Home/*` and the HTML pages.
//!
//! The actions take form-encoded bodies and answer `{"success": bool}` or a
//! JSON array. Pages fall back to the login form when nobody is logged in.

use axum::{
	extract::State,
	routing::{get, post},
	Form, Json, Router,
};
use maud::Markup;
use sqlx::SqlitePool;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::trace::TraceLayer;

use crate::catalog;
use crate::error::{AppError, AppResult};
use crate::session::{Session, SessionStore};
use crate::types::{CatalogEntry, FormLogin, FormSerial, MyBook, Success};
use crate::views;

#[derive(Clone)]
pub struct AppState {
	pub db: SqlitePool,
	pub sessions: SessionStore,
}

impl AppState {
	pub fn new(db: SqlitePool, session_cookie: impl Into<String>) -> Self {
		AppState {
			db,
			sessions: SessionStore::new(session_cookie),
		}
	}
}

pub fn router(state: AppState) -> Router {
	axum::Router::new()
		.route("/", get(index))
		.route("/Home", get(index))
		.route("/Home/Index", get(index))
		.route("/Home/MyBooks", get(my_books))
		.route("/Home/Login", get(login))
		.route("/Home/About", get(about))
		.route("/Home/Contact", get(contact))
		.route("/Home/CheckLogin", post(check_login))
		.route("/Home/LogOut", post(log_out))
		.route("/Home/AllTitles", post(all_titles))
		.route("/Home/ListMyBooks", post(list_my_books))
		.route("/Home/CheckOutBook", post(check_out_book))
		.route("/Home/ReturnBook", post(return_book))
		.layer(CookieManagerLayer::new())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

pub async fn check_login(
	State(state): State<AppState>,
	cookies: Cookies,
	Form(login): Form<FormLogin>,
) -> AppResult<Json<Success>> {
	let Some(patron) = catalog::authenticate(&state.db, &login.name, &login.cardnum).await? else {
		tracing::info!(name = %login.name, cardnum = %login.cardnum, "Login rejected");
		return Ok(Json(false.into()));
	};

	tracing::info!(name = %patron.name, card = patron.card_num, "Logged in");
	state.sessions.login(&cookies, Session::logged_in(patron.name, patron.card_num)).await;
	Ok(Json(true.into()))
}

pub async fn log_out(State(state): State<AppState>, cookies: Cookies) -> Json<Success> {
	state.sessions.logout(&cookies).await;
	Json(true.into())
}

pub async fn all_titles(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntry>>> {
	Ok(Json(catalog::list_catalog(&state.db).await?))
}

pub async fn list_my_books(
	State(state): State<AppState>,
	cookies: Cookies,
) -> AppResult<Json<Vec<MyBook>>> {
	let session = state.sessions.current(&cookies).await;
	Ok(Json(catalog::list_my_checkouts(&state.db, &session).await?))
}

pub async fn check_out_book(
	State(state): State<AppState>,
	cookies: Cookies,
	Form(form): Form<FormSerial>,
) -> AppResult<Json<Success>> {
	let serial = form.serial().ok_or_else(|| {
		AppError::BadRequest(format!("{:?} is not a copy serial number", form.serial))
	})?;
	let session = state.sessions.current(&cookies).await;
	catalog::check_out(&state.db, &session, serial).await?;
	Ok(Json(true.into()))
}

pub async fn return_book(
	State(state): State<AppState>,
	cookies: Cookies,
	Form(form): Form<FormSerial>,
) -> AppResult<Json<Success>> {
	// a serial that can't name a copy can't be on loan either
	if let Some(serial) = form.serial() {
		let session = state.sessions.current(&cookies).await;
		catalog::return_book(&state.db, &session, serial).await?;
	}
	Ok(Json(true.into()))
}

pub async fn index(State(state): State<AppState>, cookies: Cookies) -> AppResult<Markup> {
	let session = state.sessions.current(&cookies).await;
	if !session.is_logged_in() {
		return Ok(views::login("Please login."));
	}
	let entries = catalog::list_catalog(&state.db).await?;
	Ok(views::catalog(&session, &entries))
}

pub async fn my_books(State(state): State<AppState>, cookies: Cookies) -> AppResult<Markup> {
	let session = state.sessions.current(&cookies).await;
	if !session.is_logged_in() {
		return Ok(views::login("Please login."));
	}
	let books = catalog::list_my_checkouts(&state.db, &session).await?;
	Ok(views::my_books(&session, &books))
}

/// Serving the login form also forgets whoever was logged in.
pub async fn login(State(state): State<AppState>, cookies: Cookies) -> Markup {
	state.sessions.logout(&cookies).await;
	views::login("Please login.")
}

pub async fn about(State(state): State<AppState>, cookies: Cookies) -> Markup {
	views::about(&state.sessions.current(&cookies).await)
}

pub async fn contact(State(state): State<AppState>, cookies: Cookies) -> Markup {
	views::contact(&state.sessions.current(&cookies).await)
}
