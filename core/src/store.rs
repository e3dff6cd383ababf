//! In-memory item collection backing `/list`, `/search`, `/add` and
//! `/delete`.
//!
//! # Design
//! Items live in a `Vec` so insertion order is what clients observe. Ids are
//! not unique: the seed data and the delete semantics both allow several
//! items to share one. Validation failures come back as
//! `Outcome::Rejected`, which serializes to `{ "error": ... }` and is sent
//! with a 200 like any other payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Fault;

/// A single record in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    /// A fully populated record, the shape used by seed and demo data.
    pub fn record(id: i64, name: &str, amount: i64, date: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            amount: Some(amount.into()),
            date: Some(date.to_string()),
            description: None,
        }
    }
}

/// Either the requested payload or a client-facing validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Done(T),
    Rejected { error: String },
}

impl<T> Outcome<T> {
    fn rejected(message: impl Into<String>) -> Self {
        Outcome::Rejected {
            error: message.into(),
        }
    }
}

/// `{ count, items }` as returned by list and search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub count: usize,
    pub items: Vec<Item>,
}

impl Listing {
    fn new(items: Vec<Item>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// `{ deleted: id }` as returned by a successful delete, echoing the id
/// exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: Value,
}

/// Ordered, non-persistent item collection.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The collection a fresh server starts with.
    pub fn seeded() -> Self {
        Self::new(vec![
            Item::record(1, "A", 30, "03-01-2025"),
            Item::record(2, "B", 20, "03-01-2025"),
            Item::record(3, "C", 30, "03-01-2025"),
            Item::record(4, "D", 40, "03-01-2025"),
        ])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item in insertion order. The listing is a copy.
    pub fn list(&self) -> Listing {
        Listing::new(self.items.clone())
    }

    /// Items whose name contains `q` (case-sensitive substring).
    pub fn search(&self, q: Option<&str>) -> Outcome<Listing> {
        let Some(q) = q else {
            return Outcome::rejected("q parameter required");
        };
        let matches = self
            .items
            .iter()
            .filter(|item| item.name.contains(q))
            .cloned()
            .collect();
        Outcome::Done(Listing::new(matches))
    }

    /// Append a new item and return it.
    ///
    /// The id is the last item's id plus one, so it depends on insertion
    /// order rather than on the largest id. An empty collection has no last
    /// item and yields `Fault::EmptyCollection`.
    pub fn add(
        &mut self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome<Item>, Fault> {
        let (Some(name), Some(description)) = (name, description) else {
            return Ok(Outcome::rejected(
                "name and description are required parameters",
            ));
        };
        let last = self.items.last().ok_or(Fault::EmptyCollection)?;
        let item = Item {
            id: last.id + 1,
            name,
            amount: None,
            date: None,
            description: Some(description),
        };
        self.items.push(item.clone());
        Ok(Outcome::Done(item))
    }

    /// Remove the first item carrying `id`, leaving any later duplicates.
    ///
    /// `id` is compared by numeric value, so `2.0` matches an item with id
    /// 2. Values that are not numbers never match.
    pub fn delete(&mut self, id: Option<&Value>) -> Outcome<Deleted> {
        let Some(id) = id else {
            return Outcome::rejected("id parameter required");
        };
        match self.items.iter().position(|item| id_matches(item.id, id)) {
            Some(index) => {
                self.items.remove(index);
                Outcome::Done(Deleted {
                    deleted: id.clone(),
                })
            }
            None => Outcome::rejected(format!("item not found with id {}", display_id(id))),
        }
    }
}

fn id_matches(item_id: i64, id: &Value) -> bool {
    let Value::Number(number) = id else {
        return false;
    };
    match number.as_i64() {
        Some(id) => id == item_id,
        None => number.as_f64() == Some(item_id as f64),
    }
}

/// Strings are shown without quotes, everything else as compact JSON.
fn display_id(id: &Value) -> String {
    match id {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}
