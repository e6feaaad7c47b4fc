use std::path::PathBuf;

use declargs::{Argument, Nargs, Schema, ValueType};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Args {
    pub schema: PathBuf,
    pub verbose: bool,
    pub json: bool,
    pub schema_help: bool,
    pub tokens: Vec<String>,
}

pub fn schema() -> Schema {
    Schema::builder("Args")
        .prog(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .epilog("Pass the tokens to parse after `--`.")
        .arg("schema", Argument::new().metavar("SCHEMA").help("JSON schema document"))
        .arg(
            "verbose",
            Argument::with_flags(["-v", "--verbose"])
                .value_type(ValueType::Bool)
                .help("Enable verbose logging"),
        )
        .arg("json", Argument::switch().help("Print the parsed record as JSON"))
        .arg(
            "schema_help",
            Argument::with_flags(["--schema-help"])
                .value_type(ValueType::Bool)
                .help("Print the help of the loaded schema"),
        )
        .arg(
            "tokens",
            Argument::new().nargs(Nargs::ZeroOrMore).help("Tokens to parse with the schema"),
        )
        .build()
}

pub fn parse_args() -> Args {
    schema().parse_args().and_then(|record| record.deserialize::<Args>()).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    })
}
