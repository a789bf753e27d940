use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

/*
DROP TABLE IF EXISTS CheckedOut;
DROP TABLE IF EXISTS Inventory;
DROP TABLE IF EXISTS Titles;
DROP TABLE IF EXISTS Patrons;
*/

pub const TABLE_SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS Patrons (
	CardNum INTEGER NOT NULL PRIMARY KEY,
	Name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Titles (
	ISBN TEXT NOT NULL PRIMARY KEY,
	Title TEXT NOT NULL,
	Author TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Inventory (
	Serial INTEGER NOT NULL PRIMARY KEY,
	ISBN TEXT NOT NULL,
	FOREIGN KEY(ISBN) REFERENCES Titles(ISBN)
);

CREATE TABLE IF NOT EXISTS CheckedOut (
	Serial INTEGER NOT NULL PRIMARY KEY,
	CardNum INTEGER NOT NULL,
	FOREIGN KEY(Serial) REFERENCES Inventory(Serial),
	FOREIGN KEY(CardNum) REFERENCES Patrons(CardNum)
);

"#;

// Dune is deliberately absent from Inventory.
pub const DEMO_DATA: &str = r#"

INSERT OR IGNORE INTO Patrons (CardNum, Name) VALUES
	(1, 'Joe'),
	(2, 'Dan'),
	(3, 'Travis'),
	(4, 'Jane');

INSERT OR IGNORE INTO Titles (ISBN, Title, Author) VALUES
	('978-0062278791', 'Travels with Charley', 'Steinbeck'),
	('978-0441172719', 'Dune', 'Herbert'),
	('978-0679732242', 'The Sound and the Fury', 'Faulkner'),
	('978-0735211292', 'Atomic Habits', 'Clear'),
	('978-0547928227', 'The Hobbit', 'Tolkien');

INSERT OR IGNORE INTO Inventory (Serial, ISBN) VALUES
	(1001, '978-0062278791'),
	(1002, '978-0679732242'),
	(1003, '978-0735211292'),
	(1004, '978-0547928227'),
	(1005, '978-0547928227');

INSERT OR IGNORE INTO CheckedOut (Serial, CardNum) VALUES
	(1001, 1),
	(1004, 2);

"#;

pub const FIND_PATRON: &str = r#"
SELECT CardNum AS card_num, Name AS name
FROM Patrons
WHERE Name = ? AND CardNum = ?
"#;

pub const ALL_TITLES: &str = r#"
SELECT
	t.ISBN AS isbn,
	t.Title AS title,
	t.Author AS author,
	i.Serial AS serial,
	COALESCE(p.Name, '') AS name
FROM Titles t
	LEFT JOIN Inventory i ON t.ISBN = i.ISBN
	LEFT JOIN CheckedOut c ON i.Serial = c.Serial
	LEFT JOIN Patrons p ON c.CardNum = p.CardNum
ORDER BY t.ISBN, i.Serial
"#;

pub const MY_BOOKS: &str = r#"
SELECT
	t.Title AS title,
	t.Author AS author,
	i.Serial AS serial
FROM Titles t
	JOIN Inventory i ON t.ISBN = i.ISBN
	JOIN CheckedOut c ON i.Serial = c.Serial
WHERE c.CardNum = ?
ORDER BY i.Serial
"#;

pub const CHECK_OUT: &str = "INSERT INTO CheckedOut (CardNum, Serial) VALUES (?, ?)";

pub const RETURN: &str = "DELETE FROM CheckedOut WHERE Serial = ? AND CardNum = ?";

/// Opens the pool described by `config`, creating the sqlite file if needed.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(config.database_url())?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(config.acquire_timeout))
		.connect_with(options).await?;

	tracing::info!(
		url = %config.database_url(),
		max_connections = config.max_connections,
		"Database connection pool created"
	);

	Ok(pool)
}

/// Creates the four tables, and loads the demo catalog when asked to.
pub async fn bootstrap(db: &SqlitePool, seed_demo: bool) -> Result<(), sqlx::Error> {
	run_script(db, TABLE_SCHEMA).await?;
	if seed_demo {
		run_script(db, DEMO_DATA).await?;
		tracing::info!("Demo catalog loaded");
	}
	Ok(())
}

// statements are split on ';', so scripts must not contain it inside literals
async fn run_script(db: &SqlitePool, script: &str) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	for statement in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
		sqlx::query(statement).execute(&mut *tx).await?;
	}
	tx.commit().await
}

#[cfg(test)]
pub const TEST_FIXTURE: &str = r#"

INSERT INTO Patrons (CardNum, Name) VALUES
	(1, 'Bob'),
	(2, 'Carol'),
	(7, 'Alice');

INSERT INTO Titles (ISBN, Title, Author) VALUES
	('T1', 'Dune', 'Herbert'),
	('T2', 'Emma', 'Austen'),
	('T3', 'Ulysses', 'Joyce'),
	('T4', 'Walden', 'Thoreau'),
	('T5', 'Beloved', 'Morrison');

INSERT INTO Inventory (Serial, ISBN) VALUES
	(100, 'T2'),
	(200, 'T3'),
	(300, 'T4'),
	(400, 'T5');

INSERT INTO CheckedOut (Serial, CardNum) VALUES
	(200, 7),
	(300, 1),
	(400, 2);

"#;

/// A single-connection in-memory pool holding the schema and `TEST_FIXTURE`.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")
		.unwrap()
		.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options).await
		.unwrap();
	bootstrap(&pool, false).await.unwrap();
	run_script(&pool, TEST_FIXTURE).await.unwrap();
	pool
}
