use serde::Deserialize;

use crate::{Error, Result, Value};

/// Parser-level settings, the counterpart of the top-level options of the engine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    pub prog: Option<String>,
    pub usage: Option<String>,
    pub description: Option<String>,
    pub epilog: Option<String>,
    pub version: Option<String>,
    pub argument_default: Option<Value>,
    pub add_help: bool,
    pub allow_abbrev: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            prog: None,
            usage: None,
            description: None,
            epilog: None,
            version: None,
            argument_default: None,
            add_help: true,
            allow_abbrev: true,
        }
    }
}

impl ParserConfig {
    /// Sets one option by name, the keyword-argument way of configuring a parser.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "prog" => self.prog = text(key, value)?,
            "usage" => self.usage = text(key, value)?,
            "description" => self.description = text(key, value)?,
            "epilog" => self.epilog = text(key, value)?,
            "version" => self.version = text(key, value)?,
            "argument_default" => {
                self.argument_default = if value.is_none() { None } else { Some(value) }
            }
            "add_help" => self.add_help = flag(key, value)?,
            "allow_abbrev" => self.allow_abbrev = flag(key, value)?,
            _ => return Err(Error::UnknownConfig { key: key.to_owned() }),
        }
        Ok(())
    }
}

fn text(key: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::None => Ok(None),
        Value::Str(s) => Ok(Some(s)),
        _ => Err(Error::InvalidConfig { key: key.to_owned(), expected: "a string" }),
    }
}

fn flag(key: &str, value: Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::InvalidConfig { key: key.to_owned(), expected: "a boolean" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_by_keyword() {
        let mut config = ParserConfig::default();
        config.set("description", "Lorem Ipsum".into()).unwrap();
        config.set("add_help", false.into()).unwrap();
        assert_eq!(config.description.as_deref(), Some("Lorem Ipsum"));
        assert!(!config.add_help);

        config.set("description", Value::None).unwrap();
        assert_eq!(config.description, None);
    }

    #[test]
    fn set_rejects_unknown_and_mistyped_keys() {
        let mut config = ParserConfig::default();
        assert!(matches!(
            config.set("wrong_kwarg", "Lorem Ipsum".into()),
            Err(Error::UnknownConfig { key }) if key == "wrong_kwarg"
        ));
        assert!(matches!(
            config.set("allow_abbrev", "yes".into()),
            Err(Error::InvalidConfig { expected: "a boolean", .. })
        ));
    }

    #[test]
    fn deserialize_fills_defaults_and_denies_unknown_fields() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"prog": "tool", "argument_default": 0}"#).unwrap();
        assert_eq!(config.prog.as_deref(), Some("tool"));
        assert_eq!(config.argument_default, Some(Value::Int(0)));
        assert!(config.add_help);
        assert!(config.allow_abbrev);

        assert!(serde_json::from_str::<ParserConfig>(r#"{"prefix": "+"}"#).is_err());
    }
}
