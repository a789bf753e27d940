use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::session::Session;
use crate::types::{CatalogEntry, MyBook};

// posts a form to one of the JSON actions and reloads (or goes to `next`) on success
const ACTIONS_JS: &str = r#"
async function act(path, fields, next) {
	const res = await fetch(path, {
		method: "POST",
		headers: { "Content-Type": "application/x-www-form-urlencoded" },
		body: new URLSearchParams(fields),
	});
	const body = await res.json();
	if (body.success) {
		if (next) { window.location = next; } else { window.location.reload(); }
	} else {
		alert(body.error || "request failed");
	}
}
"#;

fn page(title: &str, session: &Session, content: Markup) -> Markup {
	html! {
		(DOCTYPE)
		html {
			head {
				meta charset="utf-8";
				title { (title) " - Library" }
				script { (PreEscaped(ACTIONS_JS)) }
			}
			body {
				nav {
					a href="/Home/Index" { "Catalog" } " | "
					a href="/Home/MyBooks" { "My Books" } " | "
					a href="/Home/About" { "About" } " | "
					a href="/Home/Contact" { "Contact" } " | "
					@if session.is_logged_in() {
						span { "Logged in as " (session.name) " " }
						button onclick="act('/Home/LogOut', {}, '/Home/Login')" { "Log out" }
					} @else {
						a href="/Home/Login" { "Log in" }
					}
				}
				main { (content) }
			}
		}
	}
}

pub fn login(message: &str) -> Markup {
	page("Login", &Session::default(), html! {
		h2 { (message) }
		form onsubmit="event.preventDefault(); act('/Home/CheckLogin', new FormData(this), '/Home/Index')" {
			input name="name" type="text" placeholder="name" {}
			input name="cardnum" type="number" placeholder="card number" {}
			button { "Log in" }
		}
	})
}

pub fn catalog(session: &Session, entries: &[CatalogEntry]) -> Markup {
	page("Catalog", session, html! {
		table {
			thead { tr {
				th { "ISBN" }
				th { "Title" }
				th { "Author" }
				th { "Serial" }
				th { "Status" }
			} }
			tbody {
				@for entry in entries {
					tr {
						td { (entry.isbn) }
						td { (entry.title) }
						td { (entry.author) }
						@match entry.serial {
							None => {
								td {}
								td { "not owned" }
							},
							Some(serial) => {
								td { (serial) }
								td {
									@if entry.is_available() {
										button onclick=(format!("act('/Home/CheckOutBook', {{serial: {serial}}})")) { "Check out" }
									} @else {
										"checked out by " (entry.name)
									}
								}
							},
						}
					}
				}
			}
		}
	})
}

pub fn my_books(session: &Session, books: &[MyBook]) -> Markup {
	page("My Books", session, html! {
		@if books.is_empty() {
			p { "You have no books checked out." }
		}
		table {
			tbody {
				@for book in books {
					tr {
						td { (book.title) }
						td { (book.author) }
						td { (book.serial) }
						td {
							button onclick=(format!("act('/Home/ReturnBook', {{serial: {}}})", book.serial)) { "Return" }
						}
					}
				}
			}
		}
	})
}

pub fn about(session: &Session) -> Markup {
	page("About", session, html! {
		p { "Browse the catalog, check out a copy, and return it when you are done." }
	})
}

pub fn contact(session: &Session) -> Markup {
	page("Contact", session, html! {
		p { "Ask at the front desk." }
	})
}
