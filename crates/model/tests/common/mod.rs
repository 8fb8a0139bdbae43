//! Shared models for the compiler integration tests
#![allow(dead_code)]

use persist_model::{
    DefaultValue, Entity, KeyPath, Model, Projection, Property, Row, Selection,
};
use persist_value::{DataType, DecodeError};
use uuid::Uuid;

pub struct Author;
pub struct Book;
pub struct Widget;

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
        Property::to_one("author", Author::entity),
    ],
};

pub static WIDGET: Entity = Entity {
    name: "Widget",
    id: "id",
    properties: &[
        Property::value("id", DataType::Integer),
        Property::value("date", DataType::Real).with_default(DefaultValue::Now),
        Property::to_one("book", Book::entity),
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

impl Model for Widget {
    type Id = i64;
    fn entity() -> &'static Entity {
        &WIDGET
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
    pub fn title() -> KeyPath<Book, String> {
        KeyPath::new("title")
    }

    pub fn author() -> KeyPath<Book, Author> {
        KeyPath::new("author")
    }
}

impl Widget {
    pub fn id() -> KeyPath<Widget, i64> {
        KeyPath::new("id")
    }

    pub fn book() -> KeyPath<Widget, Book> {
        KeyPath::new("book")
    }
}

/// Title and author name of a book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
}

impl Projection for BookInfo {
    type Model = Book;

    fn selection() -> Selection<Book> {
        Selection::new()
            .field("title", Book::title())
            .field("author", Book::author().then(Author::name()))
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(BookInfo {
            title: row.get("title")?,
            author: row.get("author")?,
        })
    }
}

/// Name of the author of the book a widget belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAuthor {
    pub id: i64,
    pub author: String,
}

impl Projection for WidgetAuthor {
    type Model = Widget;

    fn selection() -> Selection<Widget> {
        Selection::new().field("id", Widget::id()).field(
            "author",
            Widget::book().then(Book::author()).then(Author::name()),
        )
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(WidgetAuthor {
            id: row.get("id")?,
            author: row.get("author")?,
        })
    }
}
