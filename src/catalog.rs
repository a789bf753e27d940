//! Catalog operations.
//!
//! Every operation is one unit of work: it opens a transaction from the pool,
//! runs its statements and commits. Returning early with `?` drops the
//! transaction, which rolls it back and releases the connection.

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::sql;
use crate::types::{CardNum, CatalogEntry, MyBook, Patron, Serial};

/// Finds the patron whose name and card number both match.
///
/// `cardnum` is taken as submitted; text that isn't a card number (negative,
/// too large, empty, not numeric) can't match anybody and yields `None`, same
/// as a wrong name.
pub async fn authenticate(db: &SqlitePool, name: &str, cardnum: &str) -> AppResult<Option<Patron>> {
	let Ok(card) = cardnum.trim().parse::<CardNum>() else {
		tracing::debug!(cardnum, "Card number does not parse");
		return Ok(None);
	};

	let mut tx = db.begin().await?;
	let patron = sqlx::query_as::<_, Patron>(sql::FIND_PATRON)
		.bind(name)
		.bind(card)
		.fetch_optional(&mut *tx).await?;
	tx.commit().await?;

	Ok(patron)
}

/// Every title, once per copy, with the copy's borrower if any.
pub async fn list_catalog(db: &SqlitePool) -> AppResult<Vec<CatalogEntry>> {
	let mut tx = db.begin().await?;
	let entries = sqlx::query_as::<_, CatalogEntry>(sql::ALL_TITLES)
		.fetch_all(&mut *tx).await?;
	tx.commit().await?;

	tracing::debug!(rows = entries.len(), "Listed catalog");
	Ok(entries)
}

/// Copies on loan to the session's patron; empty when logged out.
pub async fn list_my_checkouts(db: &SqlitePool, session: &Session) -> AppResult<Vec<MyBook>> {
	let Some(card) = session.card else {
		return Ok(Vec::new());
	};

	let mut tx = db.begin().await?;
	let books = sqlx::query_as::<_, MyBook>(sql::MY_BOOKS)
		.bind(card)
		.fetch_all(&mut *tx).await?;
	tx.commit().await?;

	Ok(books)
}

/// Loans `serial` to the session's patron.
///
/// Availability isn't checked up front; a copy already on loan is rejected
/// by the `CheckedOut` primary key and reported as a conflict.
pub async fn check_out(db: &SqlitePool, session: &Session, serial: Serial) -> AppResult<()> {
	let card = session.card
		.ok_or_else(|| AppError::Auth("no patron is logged in".to_string()))?;

	let mut tx = db.begin().await?;
	sqlx::query(sql::CHECK_OUT)
		.bind(card)
		.bind(serial)
		.execute(&mut *tx).await
		.map_err(|e| match e {
			sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
				tracing::warn!(serial, card, "Copy is already checked out");
				AppError::Conflict(format!("serial {serial} is already checked out"))
			}
			e => AppError::Database(e),
		})?;
	tx.commit().await?;

	tracing::info!(serial, card, "Checked out");
	Ok(())
}

/// Takes `serial` back from the session's patron.
///
/// Returns whether a loan was removed. A serial that isn't on loan to this
/// patron, or a logged out session, leaves the store untouched.
pub async fn return_book(db: &SqlitePool, session: &Session, serial: Serial) -> AppResult<bool> {
	let Some(card) = session.card else {
		return Ok(false);
	};

	let mut tx = db.begin().await?;
	let removed = sqlx::query(sql::RETURN)
		.bind(serial)
		.bind(card)
		.execute(&mut *tx).await?
		.rows_affected() > 0;
	tx.commit().await?;

	if removed {
		tracing::info!(serial, card, "Returned");
	}
	Ok(removed)
}
