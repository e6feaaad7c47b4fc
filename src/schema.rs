use std::{ffi::OsString, fs, iter, path::Path, sync::OnceLock};

use clap::Command;
use serde::Deserialize;

use crate::{argument::Resolved, compile, Argument, Error, ParserConfig, Record, Result, Value};

/// A named, ordered set of argument declarations plus parser settings.
///
/// The clap command is built from it on first use and kept for the lifetime
/// of the schema, so every parse after the first reuses it.
#[derive(Debug)]
pub struct Schema {
    name: String,
    config: ParserConfig,
    arguments: Vec<(String, Argument)>,
    compiled: OnceLock<Compiled>,
}

#[derive(Debug)]
struct Compiled {
    command: Command,
    arguments: Vec<Resolved>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            config: ParserConfig::default(),
            arguments: Vec::new(),
        }
    }

    /// Reads a schema document:
    /// `{"name": .., "config": {..}, "arguments": {"<name>": {..}, ..}}`.
    pub fn from_json_str(json: &str) -> Result<Schema> {
        let document: Document = serde_json::from_str(json)?;
        let mut builder = Schema::builder(document.name).config(document.config);
        for (name, argument) in document.arguments {
            let argument: Argument = serde_json::from_value(argument)?;
            builder = builder.arg(name, argument);
        }
        Ok(builder.build())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Schema> {
        let json = fs::read_to_string(path)?;
        Schema::from_json_str(&json)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn arguments(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.arguments.iter().map(|(name, argument)| (name.as_str(), argument))
    }

    /// The underlying clap command, built on the first call.
    pub fn get_parser(&self) -> Result<&Command> {
        Ok(&self.compiled()?.command)
    }

    fn compiled(&self) -> Result<&Compiled> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        log::debug!("Building parser for {} with {} arguments", self.name, self.arguments.len());
        let arguments = self
            .arguments
            .iter()
            .map(|(name, argument)| argument.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        let command = compile::build_command(&self.name, &self.config, &arguments)?;
        Ok(self.compiled.get_or_init(|| Compiled { command, arguments }))
    }

    /// Parses `tokens`, which do not include the program name.
    pub fn try_parse_args_from<I, T>(&self, tokens: I) -> Result<Record>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let compiled = self.compiled()?;
        let program = OsString::from(compiled.command.get_name());
        let argv = iter::once(program).chain(tokens.into_iter().map(Into::into));
        self.parse_argv(compiled, argv.collect())
    }

    /// Parses the arguments of the current process.
    pub fn try_parse_args(&self) -> Result<Record> {
        let compiled = self.compiled()?;
        self.parse_argv(compiled, std::env::args_os().collect())
    }

    /// Like [`Schema::try_parse_args_from`], but a failed parse prints the
    /// error or help and exits the process, the way clap does on its own.
    pub fn parse_args_from<I, T>(&self, tokens: I) -> Result<Record>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        exit_on_parse_error(self.try_parse_args_from(tokens))
    }

    pub fn parse_args(&self) -> Result<Record> {
        exit_on_parse_error(self.try_parse_args())
    }

    /// Builds a record from values given by name rather than parsed from tokens.
    ///
    /// Arguments left out get the value a parse without them would report.
    /// Given values are stored as they are.
    pub fn record<I, K, V>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let compiled = self.compiled()?;
        let mut given: Vec<(String, Value)> = Vec::new();
        for (name, value) in values {
            let name = name.as_ref();
            if !compiled.arguments.iter().any(|argument| argument.name == name) {
                return Err(Error::UnknownArgument { argument: name.to_owned() });
            }
            given.retain(|(existing, _)| existing != name);
            given.push((name.to_owned(), value.into()));
        }

        let argument_default = self.config.argument_default.as_ref();
        let mut fields = Vec::with_capacity(compiled.arguments.len());
        for argument in &compiled.arguments {
            let value = match given.iter().position(|(name, _)| *name == argument.name) {
                Some(i) => given.swap_remove(i).1,
                None if argument.is_required_positional() || argument.required => {
                    return Err(Error::MissingValue { argument: argument.name.clone() });
                }
                None => argument.absent_value(argument_default),
            };
            fields.push((argument.name.clone(), value));
        }
        Ok(Record::new(self.name.clone(), fields))
    }

    fn parse_argv(&self, compiled: &Compiled, argv: Vec<OsString>) -> Result<Record> {
        let matches = compiled.command.clone().try_get_matches_from(argv)?;
        let record = Record::from_matches(
            &self.name,
            &compiled.arguments,
            &matches,
            self.config.argument_default.as_ref(),
        )?;
        log::debug!("Parsed {} arguments for {}", record.len(), self.name);
        Ok(record)
    }
}

fn exit_on_parse_error(result: Result<Record>) -> Result<Record> {
    match result {
        Err(Error::Parse(err)) => err.exit(),
        other => other,
    }
}

/// Collects argument declarations and settings in order; later calls win.
#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    name: String,
    config: ParserConfig,
    arguments: Vec<(String, Argument)>,
}

impl SchemaBuilder {
    /// Declares an argument. Declaring a name again replaces the earlier
    /// declaration but keeps its position.
    pub fn arg(mut self, name: impl Into<String>, argument: Argument) -> Self {
        let name = name.into();
        match self.arguments.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = argument,
            None => self.arguments.push((name, argument)),
        }
        self
    }

    /// Copies every argument of `parent` into this schema.
    pub fn parent(mut self, parent: &Schema) -> Self {
        for (name, argument) in &parent.arguments {
            self = self.arg(name.clone(), argument.clone());
        }
        self
    }

    /// Replaces all settings at once.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Applies settings by name, e.g. `[("description", "..")]`.
    pub fn configure<I, K, V>(mut self, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in options {
            self.config.set(key.as_ref(), value.into())?;
        }
        Ok(self)
    }

    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.config.prog = Some(prog.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.config.usage = Some(usage.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.config.epilog = Some(epilog.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = Some(version.into());
        self
    }

    pub fn argument_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.config.argument_default = if value.is_none() { None } else { Some(value) };
        self
    }

    pub fn add_help(mut self, add_help: bool) -> Self {
        self.config.add_help = add_help;
        self
    }

    pub fn allow_abbrev(mut self, allow_abbrev: bool) -> Self {
        self.config.allow_abbrev = allow_abbrev;
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            config: self.config,
            arguments: self.arguments,
            compiled: OnceLock::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    name: String,
    #[serde(default)]
    config: ParserConfig,
    #[serde(default)]
    arguments: serde_json::Map<String, serde_json::Value>,
}
