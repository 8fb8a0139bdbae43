//! Library models used by the end-to-end tests
#![allow(dead_code)]

use persist::{
    DataType, DecodeError, DefaultValue, Entity, KeyPath, Model, Projection, Property, Row,
    Selection, Store, ValueSet,
};
use uuid::Uuid;

pub struct Publisher;
pub struct Writer;
pub struct Title;

pub static PUBLISHER: Entity = Entity {
    name: "Publisher",
    id: "id",
    properties: &[
        Property::value("id", DataType::Text).with_default(DefaultValue::Uuid),
        Property::value("name", DataType::Text),
        Property::value("city", DataType::Text).with_default(DefaultValue::Text("London")),
        Property::to_many("titles", Title::entity),
    ],
};

pub static WRITER: Entity = Entity {
    name: "Writer",
    id: "id",
    properties: &[
        Property::value("id", DataType::Integer),
        Property::value("name", DataType::Text),
        Property::to_one("mentor", Writer::entity).nullable(),
        Property::to_many("titles", Title::entity),
    ],
};

pub static TITLE: Entity = Entity {
    name: "Title",
    id: "id",
    properties: &[
        Property::value("id", DataType::Integer),
        Property::value("name", DataType::Text),
        Property::value("pages", DataType::Integer),
        Property::value("price", DataType::Real).nullable(),
        Property::to_one("writer", Writer::entity),
        Property::to_one("publisher", Publisher::entity),
    ],
};

impl Model for Publisher {
    type Id = Uuid;
    fn entity() -> &'static Entity {
        &PUBLISHER
    }
}

impl Model for Writer {
    type Id = i64;
    fn entity() -> &'static Entity {
        &WRITER
    }
}

impl Model for Title {
    type Id = i64;
    fn entity() -> &'static Entity {
        &TITLE
    }
}

impl Publisher {
    pub fn id() -> KeyPath<Publisher, Uuid> {
        KeyPath::new("id")
    }

    pub fn name() -> KeyPath<Publisher, String> {
        KeyPath::new("name")
    }

    pub fn city() -> KeyPath<Publisher, String> {
        KeyPath::new("city")
    }
}

impl Writer {
    pub fn id() -> KeyPath<Writer, i64> {
        KeyPath::new("id")
    }

    pub fn name() -> KeyPath<Writer, String> {
        KeyPath::new("name")
    }

    pub fn mentor() -> KeyPath<Writer, Writer> {
        KeyPath::new("mentor")
    }
}

impl Title {
    pub fn id() -> KeyPath<Title, i64> {
        KeyPath::new("id")
    }

    pub fn name() -> KeyPath<Title, String> {
        KeyPath::new("name")
    }

    pub fn pages() -> KeyPath<Title, i64> {
        KeyPath::new("pages")
    }

    pub fn price() -> KeyPath<Title, Option<f64>> {
        KeyPath::new("price")
    }

    pub fn writer() -> KeyPath<Title, Writer> {
        KeyPath::new("writer")
    }

    pub fn publisher() -> KeyPath<Title, Publisher> {
        KeyPath::new("publisher")
    }
}

/// A writer and the name of their mentor, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Mentorship {
    pub writer: String,
    pub mentor: Option<String>,
}

impl Projection for Mentorship {
    type Model = Writer;

    fn selection() -> Selection<Writer> {
        Selection::new()
            .field("writer", Writer::name())
            .field("mentor", Writer::mentor().then(Writer::name()))
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(Mentorship {
            writer: row.get("writer")?,
            mentor: row.get("mentor")?,
        })
    }
}

/// A title with its writer, publisher city and a computed price label
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub name: String,
    pub writer: String,
    pub city: String,
    pub price: f64,
}

impl Projection for Listing {
    type Model = Title;

    fn selection() -> Selection<Title> {
        Selection::new()
            .field("name", Title::name())
            .field("writer", Title::writer().then(Writer::name()))
            .field("city", Title::publisher().then(Publisher::city()))
            .field("price", Title::price().expr().coalesce(0.0))
    }

    fn decode(row: &Row) -> Result<Self, DecodeError> {
        Ok(Listing {
            name: row.get("name")?,
            writer: row.get("writer")?,
            city: row.get("city")?,
            price: row.get("price")?,
        })
    }
}

pub fn open() -> Store {
    Store::open_in_memory(&[&PUBLISHER, &WRITER, &TITLE]).unwrap()
}

pub fn writer(id: i64, name: &str) -> ValueSet<Writer> {
    ValueSet::new().set(Writer::id(), id).set(Writer::name(), name)
}

pub fn title(id: i64, name: &str, pages: i64, writer: i64, publisher: Uuid) -> ValueSet<Title> {
    ValueSet::new()
        .set(Title::id(), id)
        .set(Title::name(), name)
        .set(Title::pages(), pages)
        .relate(Title::writer(), writer)
        .relate(Title::publisher(), publisher)
}
