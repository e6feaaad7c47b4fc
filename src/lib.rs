//! Declare command-line arguments as an ordered schema and parse them with clap.
//!
//! ```
//! use declargs::{Argument, Schema, Value};
//!
//! let schema = Schema::builder("Parser")
//!     .description("Lorem Ipsum")
//!     .arg("filename", Argument::new())
//!     .arg("encoding", Argument::with_flags(["-e", "--encoding"]))
//!     .build();
//!
//! let args = schema.try_parse_args_from(["myfile", "-e", "utf-8"]).unwrap();
//! assert_eq!(args.get("encoding"), Some(&Value::from("utf-8")));
//! assert_eq!(args.to_string(), r#"Parser(filename="myfile", encoding="utf-8")"#);
//! ```

mod argument;
mod compile;
mod config;
mod error;
mod record;
mod schema;
mod util;
mod value;

pub use crate::{
    argument::{Action, Argument, Nargs},
    config::ParserConfig,
    error::{Error, Result},
    record::Record,
    schema::{Schema, SchemaBuilder},
    value::{Value, ValueType},
};
