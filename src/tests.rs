//! End to end tests driving the router with form posts and session cookies.

use axum::{
	body::Body,
	http::{header, Request, Response, StatusCode},
	Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::handlers::{self, AppState};
use crate::sql;

async fn create_test_app() -> Router {
	handlers::router(AppState::new(sql::test_pool().await, "test_session"))
}

fn post(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
	let mut request = Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
	if let Some(cookie) = cookie {
		request = request.header(header::COOKIE, cookie);
	}
	request.body(Body::from(form.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
	let mut request = Request::builder().uri(uri);
	if let Some(cookie) = cookie {
		request = request.header(header::COOKIE, cookie);
	}
	request.body(Body::empty()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response<Body>) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

/// Logs in and returns the `name=value` pair to send back as `Cookie`.
async fn login(app: &Router, name: &str, card: i64) -> String {
	let response = app.clone()
		.oneshot(post("/Home/CheckLogin", &format!("name={name}&cardnum={card}"), None))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let cookie = response.headers()
		.get(header::SET_COOKIE)
		.expect("login sets the session cookie")
		.to_str()
		.unwrap()
		.split(';')
		.next()
		.unwrap()
		.to_string();
	assert_eq!(body_json(response).await, json!({ "success": true }));
	cookie
}

async fn my_serials(app: &Router, cookie: Option<&str>) -> Vec<u64> {
	let response = app.clone()
		.oneshot(post("/Home/ListMyBooks", "", cookie))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	body_json(response).await
		.as_array()
		.unwrap()
		.iter()
		.map(|b| b["serial"].as_u64().unwrap())
		.collect()
}

#[tokio::test]
async fn test_login_rejects_mismatch() {
	let app = create_test_app().await;

	for form in [
		"name=Alice&cardnum=1",
		"name=Bob&cardnum=7",
		"name=Alice&cardnum=-1",
		"name=Alice&cardnum=99999999999999999999",
		"name=Alice&cardnum=abc",
		"name=Alice&cardnum=",
		"name=Alice",
	] {
		let response = app.clone().oneshot(post("/Home/CheckLogin", form, None)).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK, "{form}");
		assert!(response.headers().get(header::SET_COOKIE).is_none(), "{form}");
		assert_eq!(body_json(response).await, json!({ "success": false }), "{form}");
	}
}

#[tokio::test]
async fn test_login_accepts_card_num_alias() {
	let app = create_test_app().await;
	let response = app.clone()
		.oneshot(post("/Home/CheckLogin", "name=Alice&cardNum=7", None))
		.await
		.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
	let app = create_test_app().await;
	let cookie = login(&app, "Alice", 7).await;

	let response = app.clone()
		.oneshot(post("/Home/CheckLogin", "name=Bob&cardnum=2", Some(&cookie)))
		.await
		.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": false }));

	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![200]);
}

#[tokio::test]
async fn test_all_titles_shape() {
	let app = create_test_app().await;
	let response = app.clone().oneshot(post("/Home/AllTitles", "", None)).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let titles = body_json(response).await;
	let titles = titles.as_array().unwrap();
	assert_eq!(titles.len(), 5);
	assert_eq!(titles[0], json!({ "isbn": "T1", "title": "Dune", "author": "Herbert", "serial": null, "name": "" }));
	assert_eq!(titles[1], json!({ "isbn": "T2", "title": "Emma", "author": "Austen", "serial": 100, "name": "" }));
	assert_eq!(titles[2], json!({ "isbn": "T3", "title": "Ulysses", "author": "Joyce", "serial": 200, "name": "Alice" }));
}

#[tokio::test]
async fn test_my_books_without_session_is_empty() {
	let app = create_test_app().await;
	assert!(my_serials(&app, None).await.is_empty());
}

#[tokio::test]
async fn test_check_out_then_return() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;

	let response = app.clone()
		.oneshot(post("/Home/CheckOutBook", "serial=100", Some(&cookie)))
		.await
		.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": true }));
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![100, 300]);

	for _ in 0..2 {
		let response = app.clone()
			.oneshot(post("/Home/ReturnBook", "serial=100", Some(&cookie)))
			.await
			.unwrap();
		assert_eq!(body_json(response).await, json!({ "success": true }));
	}
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![300]);
}

#[tokio::test]
async fn test_check_out_borrowed_copy_conflicts() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;

	let response = app.clone()
		.oneshot(post("/Home/CheckOutBook", "serial=200", Some(&cookie)))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(body_json(response).await["status"], 409);

	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![300]);
}

#[tokio::test]
async fn test_check_out_requires_session() {
	let app = create_test_app().await;
	let response = app.clone().oneshot(post("/Home/CheckOutBook", "serial=100", None)).await.unwrap();
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_out_rejects_negative_serial() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;
	let response = app.clone()
		.oneshot(post("/Home/CheckOutBook", "serial=-5", Some(&cookie)))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["status"], 400);
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![300]);
}

#[tokio::test]
async fn test_check_out_rejects_non_numeric_serial() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;

	for form in ["serial=abc", "serial=", "serial=99999999999999999999"] {
		let response = app.clone()
			.oneshot(post("/Home/CheckOutBook", form, Some(&cookie)))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{form}");
		let body = body_json(response).await;
		assert_eq!(body["status"], 400, "{form}");
		assert!(body["error"].is_string(), "{form}");
	}
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![300]);
}

#[tokio::test]
async fn test_return_of_non_numeric_serial_is_a_no_op() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;

	for form in ["serial=abc", "serial=", "serial=-300"] {
		let response = app.clone()
			.oneshot(post("/Home/ReturnBook", form, Some(&cookie)))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK, "{form}");
		assert_eq!(body_json(response).await, json!({ "success": true }), "{form}");
	}
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![300]);
}

#[tokio::test]
async fn test_return_of_other_patrons_copy_is_a_no_op() {
	let app = create_test_app().await;
	let bob = login(&app, "Bob", 1).await;
	let alice = login(&app, "Alice", 7).await;

	let response = app.clone()
		.oneshot(post("/Home/ReturnBook", "serial=200", Some(&bob)))
		.await
		.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": true }));
	assert_eq!(my_serials(&app, Some(&alice)).await, vec![200]);
}

#[tokio::test]
async fn test_sessions_are_per_cookie() {
	let app = create_test_app().await;
	let bob = login(&app, "Bob", 1).await;
	let carol = login(&app, "Carol", 2).await;

	assert_ne!(bob, carol);
	assert_eq!(my_serials(&app, Some(&bob)).await, vec![300]);
	assert_eq!(my_serials(&app, Some(&carol)).await, vec![400]);
}

#[tokio::test]
async fn test_login_issues_fresh_token() {
	let app = create_test_app().await;
	let planted = "test_session=00000000-0000-4000-8000-000000000000";

	let response = app.clone()
		.oneshot(post("/Home/CheckLogin", "name=Alice&cardnum=7", Some(planted)))
		.await
		.unwrap();
	let cookie = response.headers()
		.get(header::SET_COOKIE)
		.unwrap()
		.to_str()
		.unwrap()
		.split(';')
		.next()
		.unwrap()
		.to_string();
	assert_ne!(cookie, planted);

	assert!(my_serials(&app, Some(planted)).await.is_empty());
	assert_eq!(my_serials(&app, Some(&cookie)).await, vec![200]);
}

#[tokio::test]
async fn test_relogin_evicts_previous_token() {
	let app = create_test_app().await;
	let first = login(&app, "Alice", 7).await;

	let response = app.clone()
		.oneshot(post("/Home/CheckLogin", "name=Bob&cardnum=1", Some(&first)))
		.await
		.unwrap();
	let second = response.headers()
		.get(header::SET_COOKIE)
		.unwrap()
		.to_str()
		.unwrap()
		.split(';')
		.next()
		.unwrap()
		.to_string();

	assert_ne!(first, second);
	assert!(my_serials(&app, Some(&first)).await.is_empty());
	assert_eq!(my_serials(&app, Some(&second)).await, vec![300]);
}

#[tokio::test]
async fn test_logout_clears_session() {
	let app = create_test_app().await;
	let cookie = login(&app, "Alice", 7).await;

	let response = app.clone().oneshot(post("/Home/LogOut", "", Some(&cookie))).await.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": true }));

	assert!(my_serials(&app, Some(&cookie)).await.is_empty());
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
	let app = create_test_app().await;
	let response = app.clone().oneshot(post("/Home/LogOut", "", None)).await.unwrap();
	assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_login_page_clears_session() {
	let app = create_test_app().await;
	let cookie = login(&app, "Alice", 7).await;

	let response = app.clone().oneshot(get("/Home/Login", Some(&cookie))).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_text(response).await.contains("Please login."));

	assert!(my_serials(&app, Some(&cookie)).await.is_empty());
}

#[tokio::test]
async fn test_index_is_gated_on_login() {
	let app = create_test_app().await;

	let response = app.clone().oneshot(get("/", None)).await.unwrap();
	let page = body_text(response).await;
	assert!(page.contains("Please login."));
	assert!(!page.contains("Ulysses"));

	let cookie = login(&app, "Alice", 7).await;
	let response = app.clone().oneshot(get("/Home/Index", Some(&cookie))).await.unwrap();
	let page = body_text(response).await;
	assert!(page.contains("Ulysses"));
	assert!(page.contains("checked out by Alice"));
	assert!(page.contains("not owned"));
}

#[tokio::test]
async fn test_my_books_page_lists_loans() {
	let app = create_test_app().await;
	let cookie = login(&app, "Bob", 1).await;

	let response = app.clone().oneshot(get("/Home/MyBooks", Some(&cookie))).await.unwrap();
	let page = body_text(response).await;
	assert!(page.contains("Walden"));
	assert!(!page.contains("Ulysses"));
}
