use serde::{Deserialize, Serialize};

pub type CardNum = u32;
pub type Serial = u32;
#[allow(clippy::upper_case_acronyms)]
pub type ISBN = String;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Patron {
	pub card_num: CardNum,
	pub name: String,
}

/// One row of the catalog: a title paired with at most one of its copies.
///
/// `serial` is `None` when the library owns no copy of the title, and `name`
/// is the borrower of that copy, or empty when it is on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CatalogEntry {
	pub isbn: ISBN,
	pub title: String,
	pub author: String,
	pub serial: Option<Serial>,
	pub name: String,
}

impl CatalogEntry {
	pub fn is_owned(&self) -> bool {
		self.serial.is_some()
	}

	pub fn is_available(&self) -> bool {
		self.is_owned() && self.name.is_empty()
	}
}

/// A copy on loan to the logged in patron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MyBook {
	pub title: String,
	pub author: String,
	pub serial: Serial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Success {
	pub success: bool,
}

impl From<bool> for Success {
	fn from(success: bool) -> Self {
		Success { success }
	}
}

/// The card number is kept as submitted; anything that doesn't parse as a
/// `CardNum` simply can't match a patron.
#[derive(Deserialize, Debug)]
pub struct FormLogin {
	#[serde(default)]
	pub name: String,
	#[serde(default, alias = "cardNum", alias = "CardNum")]
	pub cardnum: String,
}

#[derive(Deserialize, Debug)]
pub struct FormSerial {
	#[serde(default, alias = "Serial")]
	pub serial: String,
}

impl FormSerial {
	/// `None` for empty, non-numeric, negative or out of range input.
	pub fn serial(&self) -> Option<Serial> {
		self.serial.trim().parse().ok()
	}
}
