#[macro_use]
mod macros;

mod error;
pub use error::Error;

pub mod convert;
pub use convert::ConverterRegistry;

pub mod exec;
pub use exec::QueryExecutor;

pub mod factory;
pub use factory::ObjectFactory;

pub mod graph;
pub use graph::{Instance, ObjectGraph, ObjectId};

pub mod key;
pub use key::{IdentityKey, RowKey};

pub mod row;
pub use row::{ResultSetMove, RowSource, RowWindow};

pub mod schema;
pub use schema::Catalog;

pub mod value;
pub use value::Value;

/// A Result type alias that uses Hydrate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
