mod config;
pub use config::{AutoMapPolicy, Config, UnknownColumnPolicy};

mod consumer;
pub use consumer::{Collector, ConsumeContext, ResultBatch, RowConsumer};

mod cursor;
pub use cursor::{Objects, ResultCursor};

mod engine;
pub use engine::Engine;

pub use hydrate_core as core;
pub use hydrate_core::{
    Error, Instance, ObjectGraph, ObjectId, Result, ResultSetMove, RowSource, RowWindow, Value,
};
