/// A flag as clap takes it: a long name or a short character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flag<'a> {
    Long(&'a str),
    Short(char),
}

pub(crate) fn is_flag(s: &str) -> bool {
    s.starts_with('-')
}

/// Splits `--long` and `-c`; anything else is not a usable flag.
///
/// clap reads `--name=value` as a flag and its value, so `=` never appears in a flag.
pub(crate) fn split_flag(flag: &str) -> Option<Flag<'_>> {
    if flag.contains('=') {
        return None;
    }
    if let Some(long) = flag.strip_prefix("--") {
        return (!long.is_empty() && !long.starts_with('-')).then_some(Flag::Long(long));
    }
    let short = flag.strip_prefix('-')?;
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Flag::Short(c)),
        _ => None,
    }
}

/// The name an optional argument is stored under: its first long flag, else its first short one.
pub(crate) fn dest_from_flags(flags: &[String]) -> String {
    let long = flags.iter().find_map(|flag| match split_flag(flag) {
        Some(Flag::Long(long)) => Some(long.replace('-', "_")),
        _ => None,
    });
    long.or_else(|| flags.first().map(|flag| flag.trim_start_matches('-').to_owned()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_flags() {
        assert_eq!(split_flag("--count"), Some(Flag::Long("count")));
        assert_eq!(split_flag("-c"), Some(Flag::Short('c')));
        assert_eq!(split_flag("-cv"), None);
        assert_eq!(split_flag("--"), None);
        assert_eq!(split_flag("count"), None);
        assert_eq!(split_flag("--a=b"), None);
        assert_eq!(split_flag("-="), None);
    }

    #[test]
    fn dest_prefers_the_first_long_flag() {
        let flags = |fs: &[&str]| fs.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        assert_eq!(dest_from_flags(&flags(&["-c", "--count", "--total"])), "count");
        assert_eq!(dest_from_flags(&flags(&["-n", "--dry-run"])), "dry_run");
        assert_eq!(dest_from_flags(&flags(&["-e"])), "e");
    }
}
