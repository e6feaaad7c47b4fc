use std::{collections::HashMap, fmt, str::FromStr};

use clap::{
    builder::{PossibleValuesParser, ValueParser, ValueRange},
    value_parser, Arg, ArgAction, Command,
};

use crate::{
    argument::Resolved,
    util::{self, Flag},
    Action, Error, Nargs, ParserConfig, Result, ValueType,
};

/// Builds the clap command for a schema called `name`.
pub(crate) fn build_command(
    name: &str,
    config: &ParserConfig,
    arguments: &[Resolved],
) -> Result<Command> {
    check_flags(config, arguments)?;
    check_positionals(arguments)?;

    let prog = config.prog.clone().unwrap_or_else(|| name.to_owned());
    let mut command = Command::new(prog)
        .args_override_self(true)
        .infer_long_args(config.allow_abbrev)
        .disable_help_flag(!config.add_help);
    if let Some(prog) = &config.prog {
        command = command.bin_name(prog.clone());
    }
    if let Some(usage) = &config.usage {
        command = command.override_usage(usage.clone());
    }
    if let Some(description) = &config.description {
        command = command.about(description.clone());
    }
    if let Some(epilog) = &config.epilog {
        command = command.after_help(epilog.clone());
    }
    if let Some(version) = &config.version {
        command = command.version(version.clone());
    }

    for argument in arguments {
        log::trace!(
            "Registering {} argument {} as {:?}",
            if argument.positional { "positional" } else { "optional" },
            argument.name,
            argument.flags
        );
        command = command.arg(build_arg(argument));
    }
    Ok(command)
}

fn build_arg(argument: &Resolved) -> Arg {
    let action = match argument.action {
        Action::Store => ArgAction::Set,
        Action::Append => ArgAction::Append,
        Action::StoreTrue => ArgAction::SetTrue,
        Action::StoreFalse => ArgAction::SetFalse,
        Action::Count => ArgAction::Count,
    };
    let mut arg = Arg::new(argument.name.clone()).action(action);

    if argument.positional {
        arg = arg.required(argument.is_required_positional());
    } else {
        let (mut long_set, mut short_set) = (false, false);
        for flag in &argument.flags {
            match util::split_flag(flag) {
                Some(Flag::Long(long)) if !long_set => {
                    arg = arg.long(long.to_owned());
                    long_set = true;
                }
                Some(Flag::Long(long)) => arg = arg.visible_alias(long.to_owned()),
                Some(Flag::Short(short)) if !short_set => {
                    arg = arg.short(short);
                    short_set = true;
                }
                Some(Flag::Short(short)) => arg = arg.visible_short_alias(short),
                None => {}
            }
        }
        arg = arg.required(argument.required);
    }

    if let Some(help) = &argument.help {
        arg = arg.help(help.clone());
    }
    if let Some(metavar) = &argument.metavar {
        arg = arg.value_name(metavar.clone());
    }

    if argument.action.takes_value() {
        arg = arg.value_parser(value_parser(argument.value_type, argument.choices.as_deref()));
        if matches!(argument.value_type, ValueType::Int | ValueType::Float) {
            arg = arg.allow_negative_numbers(true);
        }
        if let Some(nargs) = argument.nargs {
            arg = arg.num_args(match nargs {
                Nargs::Exactly(n) => ValueRange::new(n),
                Nargs::Optional => ValueRange::new(0..=1),
                Nargs::ZeroOrMore => ValueRange::new(0..),
                Nargs::OneOrMore => ValueRange::new(1..),
            });
        }
        if let Some(value) = &argument.const_value {
            arg = arg.default_missing_value(value.clone());
        }
        if !argument.default.is_empty() {
            arg = arg.default_values(argument.default.clone());
        }
    } else if let Some(default) = argument.default.first() {
        arg = arg.default_value(default.clone());
    }
    arg
}

fn value_parser(value_type: ValueType, choices: Option<&[String]>) -> ValueParser {
    match (value_type, choices) {
        (ValueType::Str, None) => ValueParser::string(),
        (ValueType::Int, None) => value_parser!(i64).into(),
        (ValueType::Float, None) => value_parser!(f64).into(),
        (ValueType::Bool, None) => ValueParser::bool(),
        (ValueType::Str, Some(choices)) => PossibleValuesParser::new(choices.to_vec()).into(),
        (ValueType::Int, Some(choices)) => one_of::<i64>(choices),
        (ValueType::Float, Some(choices)) => one_of::<f64>(choices),
        (ValueType::Bool, Some(choices)) => one_of::<bool>(choices),
    }
}

/// Parses the value first, then checks it against the parsed choices, so
/// `0.50` matches the choice `0.5`.
fn one_of<T>(choices: &[String]) -> ValueParser
where
    T: FromStr + PartialEq + Clone + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    let allowed: Vec<T> = choices.iter().filter_map(|choice| choice.parse().ok()).collect();
    let expected = format!("expected one of {}", choices.join(", "));
    ValueParser::new(move |s: &str| -> std::result::Result<T, String> {
        let value = s.parse::<T>().map_err(|err| err.to_string())?;
        if allowed.contains(&value) {
            Ok(value)
        } else {
            Err(expected.clone())
        }
    })
}

fn check_flags(config: &ParserConfig, arguments: &[Resolved]) -> Result<()> {
    let mut reserved: Vec<(&str, [&str; 2])> = Vec::new();
    if config.add_help {
        reserved.push(("help", ["-h", "--help"]));
    }
    if config.version.is_some() {
        reserved.push(("version", ["-V", "--version"]));
    }

    let mut owners: HashMap<&str, &str> = HashMap::new();
    for (owner, flags) in &reserved {
        for flag in flags {
            owners.insert(*flag, *owner);
        }
    }

    for argument in arguments {
        if reserved.iter().any(|(owner, _)| *owner == argument.name) {
            return Err(Error::ReservedName { argument: argument.name.clone() });
        }
        if argument.positional {
            continue;
        }
        for flag in &argument.flags {
            if let Some(first) = owners.insert(flag.as_str(), argument.name.as_str()) {
                return Err(Error::DuplicateFlag {
                    flag: flag.clone(),
                    first: first.to_owned(),
                    second: argument.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_positionals(arguments: &[Resolved]) -> Result<()> {
    let positionals: Vec<&Resolved> = arguments.iter().filter(|it| it.positional).collect();
    for (i, positional) in positionals.iter().enumerate() {
        let rest = &positionals[i + 1..];
        if positional.is_multiple() && !rest.is_empty() {
            return Err(Error::PositionalOrder {
                argument: positional.name.clone(),
                reason: "only the last positional argument can take several values".to_owned(),
            });
        }
        let required_later = rest.iter().any(|it| it.is_required_positional());
        if !positional.is_required_positional() && required_later {
            return Err(Error::PositionalOrder {
                argument: positional.name.clone(),
                reason: "an optional positional argument cannot precede a required one".to_owned(),
            });
        }
    }
    Ok(())
}
