//! Entity identity and the lazy field resolution protocol
//!
//! Every scraped entity is identified by `(kind, id)`. Its fields are declared
//! up front as an ordered list of names; the first access to any of them runs
//! the type's single extraction procedure, which fills every field from one
//! fetch. The result is stored once and never re-resolved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Concrete entity type tag. Locations carry their variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Beer,
    Brewery,
    Style,
    Country,
    Region,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Beer => "Beer",
            Self::Brewery => "Brewery",
            Self::Style => "Style",
            Self::Country => "Country",
            Self::Region => "Region",
        };
        f.write_str(name)
    }
}

/// The identity of an entity. Two entities are equal iff their refs are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u32,
}

impl EntityRef {
    pub const fn new(kind: EntityKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} #{}>", self.kind, self.id)
    }
}

/// `{ id, name }` projection used when an entity is nested in another's fields
#[derive(Debug, Serialize)]
pub struct EntityStub<'a> {
    pub id: u32,
    pub name: Option<&'a str>,
}

/// Behaviour shared by every identity-bearing record
pub trait Entity {
    fn entity_ref(&self) -> EntityRef;

    /// Name supplied at construction (or scraped from a listing), if any
    fn known_name(&self) -> Option<&str>;

    fn id(&self) -> u32 {
        self.entity_ref().id
    }

    fn kind(&self) -> EntityKind {
        self.entity_ref().kind
    }

    fn stub(&self) -> EntityStub<'_> {
        EntityStub {
            id: self.id(),
            name: self.known_name(),
        }
    }
}

/// An entity whose fields resolve lazily from its page(s).
///
/// `FIELDS` is the field registry: the ordered logical field names this type
/// exposes. `project` maps a name to its value for already-resolved details.
pub trait Resolvable: Entity + Sync {
    type Details: Send + Sync;

    const FIELDS: &'static [&'static str];

    fn url(&self) -> String;

    /// Resolve (or return the cached) details for this entity
    fn resolve(&self) -> impl Future<Output = ScrapeResult<&Self::Details>> + Send;

    /// Value of one registered field for resolved details
    fn project(&self, details: &Self::Details, field: &str) -> Option<Value>;

    /// Generic resolve-or-fetch accessor by field name
    fn field(&self, name: &str) -> impl Future<Output = ScrapeResult<Value>> + Send
    where
        Self: Sized,
    {
        async move {
            if !Self::FIELDS.iter().any(|field| *field == name) {
                return Err(ScrapeError::invalid_argument(format!(
                    "{} has no field '{name}'",
                    self.kind()
                )));
            }
            let details = self.resolve().await?;
            self.project(details, name).ok_or_else(|| {
                ScrapeError::invalid_argument(format!("{} has no field '{name}'", self.kind()))
            })
        }
    }

    /// Every declared field as a flat map, led by `id` and `url`
    fn full_details(&self) -> impl Future<Output = ScrapeResult<Map<String, Value>>> + Send
    where
        Self: Sized,
    {
        async move {
            let details = self.resolve().await?;
            let mut map = Map::new();
            map.insert("id".to_string(), Value::from(self.id()));
            map.insert("url".to_string(), Value::from(self.url()));
            for name in Self::FIELDS {
                let value = self.project(details, name).unwrap_or(Value::Null);
                map.insert((*name).to_string(), value);
            }
            Ok(map)
        }
    }
}

/// Project a resolved value into JSON for [`Resolvable::project`]
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// One-time store for resolved details, shared between clones of an entity
pub struct Lazy<D> {
    cell: Arc<OnceCell<D>>,
}

impl<D> Clone for Lazy<D> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<D> Default for Lazy<D> {
    fn default() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }
}

impl<D> Lazy<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `init` unless already resolved. A failed `init` stores nothing.
    pub async fn get_or_resolve<F, Fut>(&self, init: F) -> ScrapeResult<&D>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ScrapeResult<D>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub fn get(&self) -> Option<&D> {
        self.cell.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

/// Serialize an entity as its `{ id, name }` stub
macro_rules! impl_stub_serialize {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&$crate::domain::entity::Entity::stub(self), serializer)
            }
        }
    };
}

pub(crate) use impl_stub_serialize;
