//! Shared models and helpers for store integration tests
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use persist_model::{
    DefaultValue, Entity, KeyPath, Model, Projection, Property, Row, Selection, ValueSet,
};
use persist_store::Store;
use persist_value::{DataType, DecodeError};
use uuid::Uuid;

pub struct Author;
pub struct Book;

pub static AUTHOR: Entity = Entity {
    name: "Author",
    id: "id",
    properties: &[
        Property::value("id", DataType::Integer),
        Property::value("name", DataType::Text),
        Property::value("born", DataType::Integer),
        Property::value("died", DataType::Integer).nullable(),
        Property::to_many("books", Book::entity),
    ],
};

pub static BOOK: Entity = Entity {
    name: "Book",
    id: "id",
    properties: &[
        Property::value("id", DataType::Text).with_default(DefaultValue::Uuid),
        Property::value("title", DataType::Text),
        Property::value("added", DataType::Real).with_default(DefaultValue::Now),
        Property::to_one("author", Author::entity),
    ],
};

impl Model for Author {
    type Id = i64;
    fn entity() -> &'static Entity {
        &AUTHOR
    }
}

impl Model for Book {
    type Id = Uuid;
    fn entity() -> &'static Entity {
        &BOOK
    }
}

impl Author {
    pub fn id() -> KeyPath<Author, i64> {
        KeyPath::new("id")
    }

    pub fn name() -> KeyPath<Author, String> {
        KeyPath::new("name")
    }

    pub fn born() -> KeyPath<Author, i64> {
        KeyPath::new("born")
    }

    pub fn died() -> KeyPath<Author, Option<i64>> {
        KeyPath::new("died")
    }
}

impl Book {
    pub fn id() -> KeyPath<Book, Uuid> {
        KeyPath::new("id")
    }

    pub fn title() -> KeyPath<Book, String> {
        KeyPath::new("title")
    }

    pub fn added() -> KeyPath<Book, DateTime<Utc>> {
        KeyPath::new("added")
    }

    pub fn author() -> KeyPath<Book, Author> {
        KeyPath::new("author")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorName {
    pub id: i64,
    pub name: String,
}

impl AuthorName {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl Projection for AuthorName {
    type Model = Author;

    fn selection() -> Selection<Author> {
        Selection::new()
            .field("id", Author::id())
            .field("name", Author::name())
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(AuthorName {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookInfo {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub added: DateTime<Utc>,
}

impl Projection for BookInfo {
    type Model = Book;

    fn selection() -> Selection<Book> {
        Selection::new()
            .field("id", Book::id())
            .field("title", Book::title())
            .field("author", Book::author().then(Author::name()))
            .field("added", Book::added())
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(BookInfo {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            added: row.get("added")?,
        })
    }
}

pub fn author(id: i64, name: &str, born: i64) -> ValueSet<Author> {
    ValueSet::new()
        .set(Author::id(), id)
        .set(Author::name(), name)
        .set(Author::born(), born)
}

pub fn book(title: &str, author: i64) -> ValueSet<Book> {
    ValueSet::new()
        .set(Book::title(), title)
        .relate(Book::author(), author)
}

pub fn open() -> Store {
    Store::open_in_memory(&[&AUTHOR, &BOOK]).unwrap()
}

/// Authors 1 "A" born 1900 and 2 "B" born 1950
pub fn seeded() -> Store {
    let store = open();
    store.insert(&author(1, "A", 1900)).unwrap();
    store.insert(&author(2, "B", 1950)).unwrap();
    store
}

/// Installs a subscriber honouring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
