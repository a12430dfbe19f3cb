//! Qt Linguist TS catalogs: data model, reader and writer.
/// Parse errors
mod error;
/// Catalog data model
mod model;
/// TS reader
mod parser;
/// TS writer
mod writer;

pub use error::{
    ParseError,
    ParseErrorKind,
};
pub use model::{
    Catalog,
    Context,
    Message,
    MessageRef,
    MessageStatus,
    Translation,
};
pub use parser::parse;
pub use writer::write;
