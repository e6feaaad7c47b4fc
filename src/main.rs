mod input;

use std::process;

use declargs::{Error, Schema};

use input::Args as InputArgs;

//
// declargs
//
// Parses command-line tokens with a schema read from a JSON document and
// prints the resulting record. Useful to try out a schema before declaring
// it in code:
// 1. The schema document is loaded and the parser is built from it.
//    Declaration problems (conflicting flags, bad defaults, ...) are reported here.
// 2. The tokens after `--` are parsed. Parse failures print clap's usage and exit.
// 3. The record is printed as `Name(arg=value, ...)`, or as JSON with --json.
//

fn configure_logging(args: &InputArgs) {
    let level = if args.verbose { log::Level::Debug } else { log::Level::Info };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("failed to initialize logging: {}", e);
    }
}

fn fail(e: Error) -> ! {
    log::error!("{}", e);
    process::exit(1);
}

fn main() {
    let args = input::parse_args();
    configure_logging(&args);

    log::debug!("Loading schema from {}", args.schema.display());
    let schema = Schema::from_json_file(&args.schema).unwrap_or_else(|e| fail(e));
    let parser = schema.get_parser().unwrap_or_else(|e| fail(e));
    log::debug!("Schema {} declares {} arguments", schema.name(), schema.arguments().count());

    if args.schema_help {
        if let Err(e) = parser.clone().print_help() {
            fail(e.into());
        }
        return;
    }

    let record = schema.parse_args_from(&args.tokens).unwrap_or_else(|e| fail(e));
    if args.json {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e.into()),
        }
    } else {
        println!("{}", record);
    }
}
