use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{util, Error, Result, Value, ValueType};

/// What the parser does when it meets an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Store,
    StoreTrue,
    StoreFalse,
    Append,
    Count,
}

impl Action {
    /// Whether the argument consumes values from the command line.
    pub fn takes_value(self) -> bool {
        matches!(self, Action::Store | Action::Append)
    }
}

/// How many values an argument consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "NargsRepr")]
pub enum Nargs {
    Exactly(usize),
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Nargs {
    /// Whether the parsed value is a list rather than a scalar.
    pub fn is_list(self) -> bool {
        !matches!(self, Nargs::Optional)
    }

    /// Whether the argument can be satisfied without any value.
    pub fn allows_zero(self) -> bool {
        matches!(self, Nargs::Optional | Nargs::ZeroOrMore)
    }
}

impl FromStr for Nargs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::ZeroOrMore),
            "+" => Ok(Nargs::OneOrMore),
            _ => s.parse().map(Nargs::Exactly).map_err(|_| format!("invalid nargs `{}`", s)),
        }
    }
}

impl fmt::Display for Nargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nargs::Exactly(n) => write!(f, "{}", n),
            Nargs::Optional => f.write_str("?"),
            Nargs::ZeroOrMore => f.write_str("*"),
            Nargs::OneOrMore => f.write_str("+"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NargsRepr {
    Count(usize),
    Symbol(String),
}

impl TryFrom<NargsRepr> for Nargs {
    type Error = String;

    fn try_from(repr: NargsRepr) -> Result<Self, String> {
        match repr {
            NargsRepr::Count(n) => Ok(Nargs::Exactly(n)),
            NargsRepr::Symbol(s) => s.parse(),
        }
    }
}

/// The declaration of one command-line argument.
///
/// Without explicit flags, the name the argument is declared under is used:
/// as is for a positional argument, or as `--name` otherwise. With flags, the
/// first flag decides: anything not starting with `-` is positional, even when
/// `positional(false)` was requested.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Argument {
    flags: Vec<String>,
    positional: bool,
    action: Option<Action>,
    #[serde(rename = "type")]
    value_type: Option<ValueType>,
    default: Option<Value>,
    #[serde(rename = "const")]
    const_value: Option<Value>,
    choices: Option<Vec<Value>>,
    nargs: Option<Nargs>,
    required: bool,
    help: Option<String>,
    metavar: Option<String>,
    dest: Option<String>,
}

impl Default for Argument {
    fn default() -> Self {
        Argument {
            flags: Vec::new(),
            positional: true,
            action: None,
            value_type: None,
            default: None,
            const_value: None,
            choices: None,
            nargs: None,
            required: false,
            help: None,
            metavar: None,
            dest: None,
        }
    }
}

impl Argument {
    pub fn new() -> Argument {
        Default::default()
    }

    pub fn with_flags<I, S>(flags: I) -> Argument
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Argument { flags: flags.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    /// A `--name` boolean switch that is false unless given.
    pub fn switch() -> Argument {
        Argument::new().positional(false).value_type(ValueType::Bool)
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = if value.is_none() { None } else { Some(value) };
        self
    }

    pub fn const_value(mut self, value: impl Into<Value>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn is_positional(&self) -> bool {
        match self.flags.first() {
            Some(first) => !util::is_flag(first),
            None => self.positional,
        }
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn get_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The action in effect: a `bool` argument without an explicit action is a switch.
    pub fn effective_action(&self) -> Action {
        match (self.action, self.value_type) {
            (Some(action), _) => action,
            (None, Some(ValueType::Bool)) => Action::StoreTrue,
            (None, _) => Action::Store,
        }
    }

    /// Resolves the declaration made under `name` into the settings the parser is built from.
    pub(crate) fn resolve(&self, name: &str) -> Result<Resolved> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let action = self.effective_action();
        let positional = self.is_positional();
        let flags = if !self.flags.is_empty() {
            self.flags.clone()
        } else if positional {
            vec![name.to_owned()]
        } else {
            vec![format!("--{}", name)]
        };

        if positional {
            if let Some(extra) = flags.get(1) {
                return Err(Error::InvalidFlag { argument: name.to_owned(), flag: extra.clone() });
            }
            if !action.takes_value() {
                return Err(Error::invalid_option(
                    name,
                    format!("positional arguments must take a value, not `{:?}`", action),
                ));
            }
            if self.required {
                return Err(Error::RequiredPositional { argument: name.to_owned() });
            }
        } else if let Some(bad) = flags.iter().find(|flag| util::split_flag(flag).is_none()) {
            return Err(Error::InvalidFlag { argument: name.to_owned(), flag: bad.clone() });
        }

        if self.required && self.default.is_some() {
            return Err(Error::RequiredWithDefault { argument: name.to_owned() });
        }

        let dest = match &self.dest {
            Some(dest) => dest.clone(),
            None if positional => flags[0].clone(),
            None => util::dest_from_flags(&flags),
        };
        if dest != name {
            return Err(Error::DestMismatch { argument: name.to_owned(), dest });
        }

        let value_type = self.value_type.unwrap_or_default();
        let resolved = Resolved {
            name: name.to_owned(),
            flags,
            positional,
            action,
            value_type,
            nargs: self.nargs,
            default: Vec::new(),
            const_value: None,
            choices: None,
            required: self.required,
            help: self.help.clone(),
            metavar: self.metavar.clone(),
            fallback: self.default.clone(),
        };
        if action.takes_value() {
            self.resolve_values(resolved)
        } else {
            self.resolve_switch(resolved)
        }
    }

    fn resolve_switch(&self, mut resolved: Resolved) -> Result<Resolved> {
        let name = resolved.name.clone();
        let name = name.as_str();
        let action = resolved.action;
        if self.nargs.is_some() || self.choices.is_some() || self.const_value.is_some() {
            return Err(Error::invalid_option(
                name,
                format!("`{:?}` takes no value; `nargs`, `choices` and `const` do not apply", action),
            ));
        }
        if self.metavar.is_some() {
            return Err(Error::invalid_option(name, "`metavar` needs a value-taking action"));
        }
        let type_ok = match action {
            Action::Count => self.value_type.is_none(),
            _ => matches!(self.value_type, None | Some(ValueType::Bool)),
        };
        if !type_ok {
            return Err(Error::invalid_option(
                name,
                format!("`{:?}` cannot be combined with a `type`", action),
            ));
        }
        match (&self.default, action) {
            (None, _) => {}
            (Some(Value::Bool(b)), Action::StoreTrue | Action::StoreFalse) => {
                resolved.default = vec![b.to_string()];
            }
            (Some(other), Action::Count) => {
                return Err(Error::invalid_option(
                    name,
                    format!("`Count` starts at 0 and cannot default to {}", other),
                ));
            }
            (Some(other), _) => {
                return Err(Error::invalid_option(
                    name,
                    format!("a switch can only default to true or false, not {}", other),
                ));
            }
        }
        resolved.value_type = ValueType::Bool;
        Ok(resolved)
    }

    fn resolve_values(&self, mut resolved: Resolved) -> Result<Resolved> {
        let name = resolved.name.clone();
        let name = name.as_str();
        let ty = resolved.value_type;
        let literal = |value: &Value, what: &str| {
            value.to_literal(ty).ok_or_else(|| {
                Error::invalid_option(name, format!("{} {} is not a valid `{}`", what, value, ty))
            })
        };

        if self.nargs == Some(Nargs::Exactly(0)) {
            return Err(Error::invalid_option(name, "`nargs` must be at least 1"));
        }

        let choices = match &self.choices {
            Some(choices) => Some(
                choices.iter().map(|choice| literal(choice, "choice")).collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        let allowed: Option<Vec<Value>> = choices
            .as_ref()
            .map(|choices| choices.iter().map(|lit| Value::from_literal(lit, ty)).collect());
        let in_choices = |lit: &String, value: &Value| match &allowed {
            Some(allowed) if !allowed.contains(&Value::from_literal(lit, ty)) => {
                Err(Error::invalid_option(name, format!("{} is not one of the choices", value)))
            }
            _ => Ok(()),
        };

        if let Some(value) = &self.const_value {
            if self.nargs != Some(Nargs::Optional) {
                return Err(Error::invalid_option(name, "`const` requires `nargs='?'`"));
            }
            let lit = literal(value, "const")?;
            in_choices(&lit, value)?;
            resolved.const_value = Some(lit);
        }

        if let Some(default) = &self.default {
            let items: Vec<&Value> = match default {
                Value::List(items) if resolved.is_list() => items.iter().collect(),
                Value::List(_) => {
                    return Err(Error::invalid_option(
                        name,
                        "a list default needs `append` or a list `nargs`",
                    ))
                }
                scalar => vec![scalar],
            };
            for item in items {
                let lit = literal(item, "default")?;
                in_choices(&lit, item)?;
                resolved.default.push(lit);
            }
        }

        resolved.choices = choices;
        Ok(resolved)
    }
}

/// An argument after its declaration has been checked against its name.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub(crate) name: String,
    pub(crate) flags: Vec<String>,
    pub(crate) positional: bool,
    pub(crate) action: Action,
    pub(crate) value_type: ValueType,
    pub(crate) nargs: Option<Nargs>,
    /// Engine-side default literals.
    pub(crate) default: Vec<String>,
    pub(crate) const_value: Option<String>,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) required: bool,
    pub(crate) help: Option<String>,
    pub(crate) metavar: Option<String>,
    /// The declared default, reported when the argument is absent.
    pub(crate) fallback: Option<Value>,
}

impl Resolved {
    /// Whether the parsed value is a list.
    pub(crate) fn is_list(&self) -> bool {
        self.action == Action::Append || self.nargs.map_or(false, Nargs::is_list)
    }

    /// Whether the argument can take more than one value in total.
    pub(crate) fn is_multiple(&self) -> bool {
        match (self.action, self.nargs) {
            (Action::Append, _) => true,
            (_, Some(Nargs::Exactly(n))) => n > 1,
            (_, Some(Nargs::ZeroOrMore | Nargs::OneOrMore)) => true,
            _ => false,
        }
    }

    /// The declared default as a value of the argument's type, in its declared shape.
    pub(crate) fn default_value(&self) -> Option<Value> {
        let fallback = self.fallback.as_ref()?;
        let mut items = self.default.iter().map(|lit| Value::from_literal(lit, self.value_type));
        match fallback {
            Value::List(_) => Some(Value::List(items.collect())),
            _ => items.next(),
        }
    }

    /// The value reported when the argument does not appear.
    pub(crate) fn absent_value(&self, argument_default: Option<&Value>) -> Value {
        match self.action {
            Action::StoreTrue | Action::StoreFalse => self
                .default_value()
                .unwrap_or(Value::Bool(self.action == Action::StoreFalse)),
            Action::Count => Value::Int(0),
            Action::Store | Action::Append => self
                .default_value()
                .or_else(|| {
                    let empty = self.positional && self.nargs == Some(Nargs::ZeroOrMore);
                    empty.then(|| Value::List(Vec::new()))
                })
                .or_else(|| argument_default.cloned())
                .unwrap_or(Value::None),
        }
    }

    /// Whether a positional argument must appear on the command line.
    pub(crate) fn is_required_positional(&self) -> bool {
        self.positional
            && self.default.is_empty()
            && !self.nargs.map_or(false, Nargs::allows_zero)
    }
}
