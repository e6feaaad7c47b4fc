use std::fmt;

use clap::{
    parser::{MatchesError, ValueSource},
    ArgMatches,
};
use serde::{de::DeserializeOwned, ser::SerializeMap, Serialize, Serializer};

use crate::{argument::Resolved, Action, Error, Result, Value, ValueType};

/// The parsed values of one command line, one field per declared argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>, fields: Vec<(String, Value)>) -> Record {
        Record { name: name.into(), fields }
    }

    pub(crate) fn from_matches(
        name: &str,
        arguments: &[Resolved],
        matches: &ArgMatches,
        argument_default: Option<&Value>,
    ) -> Result<Record> {
        let fields = arguments
            .iter()
            .map(|argument| -> Result<(String, Value)> {
                let value = extract(argument, matches, argument_default).map_err(|source| {
                    Error::Extract { argument: argument.name.clone(), source }
                })?;
                Ok((argument.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Record::new(name, fields))
    }

    /// The name of the schema this record was parsed with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Maps the record onto a typed struct whose fields are named like the arguments.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn extract(
    argument: &Resolved,
    matches: &ArgMatches,
    argument_default: Option<&Value>,
) -> Result<Value, MatchesError> {
    let id = argument.name.as_str();
    match argument.action {
        Action::StoreTrue | Action::StoreFalse => {
            let default = argument.action == Action::StoreFalse;
            Ok(Value::Bool(matches.try_get_one::<bool>(id)?.copied().unwrap_or(default)))
        }
        // clap keeps counts in a `u8`, so they stop at 255.
        Action::Count => {
            let count = matches.try_get_one::<u8>(id)?.copied().unwrap_or(0);
            Ok(Value::Int(i64::from(count)))
        }
        Action::Store | Action::Append => {
            if matches.value_source(id) == Some(ValueSource::DefaultValue) {
                return Ok(argument.absent_value(argument_default));
            }
            let values = match argument.value_type {
                ValueType::Str => many(matches, id, |s: &String| Value::Str(s.clone()))?,
                ValueType::Int => many(matches, id, |i: &i64| Value::Int(*i))?,
                ValueType::Float => many(matches, id, |f: &f64| Value::Float(*f))?,
                ValueType::Bool => many(matches, id, |b: &bool| Value::Bool(*b))?,
            };
            let value = match values {
                Some(values) if argument.is_list() => Value::List(values),
                Some(mut values) => values.pop().unwrap_or(Value::None),
                None => argument.absent_value(argument_default),
            };
            Ok(value)
        }
    }
}

fn many<T, F>(
    matches: &ArgMatches,
    id: &str,
    to_value: F,
) -> Result<Option<Vec<Value>>, MatchesError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> Value,
{
    Ok(matches.try_get_many::<T>(id)?.map(|values| values.map(to_value).collect()))
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str(")")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use serde::Deserialize;

    use super::*;

    fn record() -> Record {
        Record::new(
            "Parser",
            vec![
                ("filename".to_owned(), Value::from("myfile")),
                ("count".to_owned(), Value::Int(3)),
                ("verbose".to_owned(), Value::Bool(false)),
                ("include".to_owned(), Value::from(vec!["a", "b"])),
                ("encoding".to_owned(), Value::None),
            ],
        )
    }

    #[test]
    fn display_lists_every_field_in_order() {
        expect![[r#"Parser(filename="myfile", count=3, verbose=false, include=["a", "b"], encoding=None)"#]]
            .assert_eq(&record().to_string());
    }

    #[test]
    fn serializes_as_an_ordered_map() {
        expect![[r#"{"filename":"myfile","count":3,"verbose":false,"include":["a","b"],"encoding":null}"#]]
            .assert_eq(&serde_json::to_string(&record()).unwrap());
    }

    #[test]
    fn deserializes_into_a_typed_struct() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Args {
            filename: String,
            count: u32,
            verbose: bool,
            include: Vec<String>,
            encoding: Option<String>,
        }

        let args: Args = record().deserialize().unwrap();
        assert_eq!(
            args,
            Args {
                filename: "myfile".to_owned(),
                count: 3,
                verbose: false,
                include: vec!["a".to_owned(), "b".to_owned()],
                encoding: None,
            }
        );

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            count: String,
        }
        assert!(matches!(record().deserialize::<Wrong>(), Err(Error::Json(_))));
    }

    #[test]
    fn accessors() {
        let record = record();
        assert_eq!(record.name(), "Parser");
        assert_eq!(record.len(), 5);
        assert_eq!(record.get("count"), Some(&Value::Int(3)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(
            record.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            ["filename", "count", "verbose", "include", "encoding"]
        );
    }
}
