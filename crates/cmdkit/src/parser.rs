//! Argument tokenizer and parser.
//!
//! [`parse_with_env`] consumes a raw token list against one resolved
//! command's effective flag set, producing positional arguments and a
//! flag-name → typed-value map. Resolution precedence for each declared
//! flag is strictly: explicit CLI value > environment variable > declared
//! default. The parser fails fast: the first error is returned and no
//! partial result is surfaced.

use indexmap::IndexMap;

use crate::error::Error;
use crate::flag::{Flag, FlagValue, find_flag, parse_bool};

/// Positional arguments plus the resolved flag values of one invocation.
pub type ParsedArgs = (Vec<String>, IndexMap<String, FlagValue>);

/// Parse `tokens`, reading fallback values from the process environment.
///
/// Environment variables are read once per call; nothing is cached across
/// invocations.
pub fn parse(flags: &[Flag], tokens: &[String], allow_unknown: bool) -> Result<ParsedArgs, Error> {
    let env: Vec<(String, String)> = std::env::vars().collect();
    parse_with_env(flags, tokens, allow_unknown, &env)
}

/// Parse `tokens` against `flags`, using `env` as the environment-variable
/// source for flags that declare one.
///
/// Supports `--flag=value`, `--flag value`, `-flag=value`, `-flag value`
/// and single-character shorts; a bare `--` irreversibly switches the rest
/// of the stream to positional-only. When `allow_unknown` is false, any
/// flag not in `flags` yields [`Error::UnknownFlag`].
pub fn parse_with_env(
    flags: &[Flag],
    tokens: &[String],
    allow_unknown: bool,
    env: &[(String, String)],
) -> Result<ParsedArgs, Error> {
    let mut positional = Vec::new();
    let mut values: IndexMap<String, FlagValue> = IndexMap::new();
    let mut stop_flags = false;

    let mut i = 0;
    while i < tokens.len() {
        let arg = tokens[i].as_str();

        // After --, everything is positional.
        if !stop_flags && arg == "--" {
            tracing::trace!("bare separator seen; remaining tokens are positional");
            stop_flags = true;
            i += 1;
            continue;
        }

        if stop_flags || !arg.starts_with('-') {
            positional.push(arg.to_string());
            i += 1;
            continue;
        }

        let (name, value, consumed) = parse_flag(flags, tokens, i, allow_unknown)?;

        match (values.get_mut(&name), value) {
            // Slice flags accumulate across occurrences.
            (Some(FlagValue::List(existing)), FlagValue::List(items)) => {
                existing.extend(items);
            }
            // Count flags add up.
            (Some(FlagValue::Count(existing)), FlagValue::Count(n)) => {
                *existing += n;
            }
            (_, value) => {
                values.insert(name, value);
            }
        }
        i += consumed;
    }

    // Environment fallback for flags not provided on the command line.
    for flag in flags {
        if values.contains_key(flag.name()) {
            continue;
        }
        if let Some(var) = flag.env_var() {
            if let Some(raw) = env_lookup(env, var) {
                values.insert(flag.name().to_string(), flag.parse_value(raw)?);
            }
        }
    }

    // Declared defaults for flags still absent.
    for flag in flags {
        if values.contains_key(flag.name()) {
            continue;
        }
        if let Some(default) = flag.default() {
            if !default.is_empty() {
                values.insert(flag.name().to_string(), flag.parse_value(default)?);
            }
        }
    }

    // Required flags must be present after all three resolution passes.
    for flag in flags {
        if flag.is_required() && !values.contains_key(flag.name()) {
            return Err(Error::RequiredFlag(flag.name().to_string()));
        }
    }

    Ok((positional, values))
}

/// Parse a single flag reference starting at `tokens[i]`.
///
/// Returns the canonical flag name, its typed value, and the number of
/// tokens consumed. Short names resolve to their long name. Unknown flags
/// (when permitted) are treated as string flags consuming one value token.
fn parse_flag(
    flags: &[Flag],
    tokens: &[String],
    i: usize,
    allow_unknown: bool,
) -> Result<(String, FlagValue, usize), Error> {
    let arg = tokens[i].as_str();

    // Three or more leading dashes is always malformed.
    if arg.starts_with("---") {
        return Err(Error::InvalidFlagValue(arg.to_string()));
    }

    let name = arg.trim_start_matches('-');

    // --flag=value / -flag=value: the value rides in the same token.
    if let Some((flag_name, value)) = name.split_once('=') {
        return match find_flag(flags, flag_name) {
            Some(flag) => {
                let parsed = flag.parse_value(value)?;
                Ok((flag.name().to_string(), parsed, 1))
            }
            None if allow_unknown => {
                Ok((flag_name.to_string(), FlagValue::Str(value.to_string()), 1))
            }
            None => Err(Error::UnknownFlag(flag_name.to_string())),
        };
    }

    let flag = find_flag(flags, name);

    // Bundled count flags: -vvv where every character resolves to the same
    // count flag (by short alias or single-character long name) counts as
    // that flag repeated N times.
    if flag.is_none() && name.len() > 1 && all_same_char(name) {
        let first = name.chars().next().unwrap_or_default();
        if let Some(counter) = find_flag(flags, &first.to_string()) {
            if counter.kind() == crate::FlagType::Count {
                let n = name.chars().count() as u64;
                return Ok((counter.name().to_string(), FlagValue::Count(n), 1));
            }
        }
    }

    if flag.is_none() && !allow_unknown {
        return Err(Error::UnknownFlag(name.to_string()));
    }

    if let Some(flag) = flag {
        match flag.kind() {
            // Bool flags only consume the next token when it reads as a
            // boolean literal; otherwise they default to true.
            crate::FlagType::Bool => {
                if let Some(next) = tokens.get(i + 1) {
                    if let Some(b) = parse_bool(next) {
                        return Ok((flag.name().to_string(), FlagValue::Bool(b), 2));
                    }
                }
                return Ok((flag.name().to_string(), FlagValue::Bool(true), 1));
            }
            // Count flags never consume a value token.
            crate::FlagType::Count => {
                return Ok((flag.name().to_string(), FlagValue::Count(1), 1));
            }
            _ => {}
        }
    }

    // --flag value: the next token is the value.
    let Some(value) = tokens.get(i + 1) else {
        return Err(Error::InvalidFlagValue(format!(
            "flag --{name} requires a value"
        )));
    };

    match flag {
        Some(flag) => {
            let parsed = flag.parse_value(value)?;
            Ok((flag.name().to_string(), parsed, 2))
        }
        None => Ok((name.to_string(), FlagValue::Str(value.to_string()), 2)),
    }
}

fn all_same_char(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

fn env_lookup<'e>(env: &'e [(String, String)], key: &str) -> Option<&'e str> {
    env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagType;

    fn scalar_flags() -> Vec<Flag> {
        vec![
            Flag::new("name", FlagType::String),
            Flag::new("count", FlagType::Int),
            Flag::new("verbose", FlagType::Bool),
            Flag::new("rate", FlagType::Float),
        ]
    }

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn parse_ok(flags: &[Flag], args: &[&str]) -> ParsedArgs {
        parse_with_env(flags, &tokens(args), false, &[]).unwrap()
    }

    #[test]
    fn flag_syntax_forms_are_equivalent() {
        let flags = scalar_flags();
        for args in [
            ["--name=alice"].as_slice(),
            &["--name", "alice"],
            &["-name=alice"],
            &["-name", "alice"],
        ] {
            let (_, values) = parse_ok(&flags, args);
            assert_eq!(
                values.get("name"),
                Some(&FlagValue::Str("alice".into())),
                "args: {args:?}"
            );
        }
    }

    #[test]
    fn mixed_flags_and_positionals() {
        let flags = scalar_flags();
        let (pos, values) = parse_ok(&flags, &["--name", "eve", "pos1", "--count", "5", "pos2"]);
        assert_eq!(pos, vec!["pos1", "pos2"]);
        assert_eq!(values.get("name"), Some(&FlagValue::Str("eve".into())));
        assert_eq!(values.get("count"), Some(&FlagValue::Int(5)));
    }

    #[test]
    fn bare_separator_makes_everything_positional() {
        let flags = scalar_flags();
        let (pos, values) = parse_ok(&flags, &["--name", "frank", "--", "--not-a-flag", "-x"]);
        assert_eq!(pos, vec!["--not-a-flag", "-x"]);
        assert_eq!(values.get("name"), Some(&FlagValue::Str("frank".into())));
    }

    #[test]
    fn bool_consumption() {
        let flags = scalar_flags();

        let (_, values) = parse_ok(&flags, &["--verbose"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(true)));

        let (_, values) = parse_ok(&flags, &["--verbose", "false"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(false)));

        let (_, values) = parse_ok(&flags, &["--verbose", "0"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(false)));

        // A non-boolean next token stays positional.
        let (pos, values) = parse_ok(&flags, &["--verbose", "pos"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(true)));
        assert_eq!(pos, vec!["pos"]);
    }

    #[test]
    fn invalid_values_fail_fast() {
        let flags = scalar_flags();
        for args in [
            ["--count", "abc"].as_slice(),
            &["--rate", "notfloat"],
            &["--name"],
            &["--count=1.5"],
        ] {
            let err = parse_with_env(&flags, &tokens(args), false, &[]).unwrap_err();
            assert!(
                matches!(err, Error::InvalidFlagValue(_)),
                "args {args:?} gave {err}"
            );
        }
    }

    #[test]
    fn triple_dash_is_always_malformed() {
        let flags = scalar_flags();
        for allow_unknown in [false, true] {
            let err =
                parse_with_env(&flags, &tokens(&["---name", "x"]), allow_unknown, &[]).unwrap_err();
            assert!(matches!(err, Error::InvalidFlagValue(_)));
        }
    }

    #[test]
    fn unknown_flag_policy() {
        let flags = scalar_flags();

        let err = parse_with_env(&flags, &tokens(&["--nope", "v"]), false, &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag(ref n) if n == "nope"));

        // Permitted unknown flags consume one value token and stay raw
        // strings: no type inference.
        let (pos, values) = parse_with_env(&flags, &tokens(&["--nope", "42"]), true, &[]).unwrap();
        assert_eq!(values.get("nope"), Some(&FlagValue::Str("42".into())));
        assert!(pos.is_empty());

        let (_, values) = parse_with_env(&flags, &tokens(&["--nope=true"]), true, &[]).unwrap();
        assert_eq!(values.get("nope"), Some(&FlagValue::Str("true".into())));
    }

    #[test]
    fn short_flags() {
        let flags = vec![
            Flag::new("verbose", FlagType::Bool).short('v'),
            Flag::new("output", FlagType::String).short('o'),
            Flag::new("count", FlagType::Int).short('n'),
        ];

        let (_, values) = parse_ok(&flags, &["-v"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(true)));

        let (_, values) = parse_ok(&flags, &["-o", "file.txt"]);
        assert_eq!(values.get("output"), Some(&FlagValue::Str("file.txt".into())));

        let (_, values) = parse_ok(&flags, &["-o=file.txt"]);
        assert_eq!(values.get("output"), Some(&FlagValue::Str("file.txt".into())));

        let (pos, values) = parse_ok(&flags, &["-v", "--output", "f", "-n", "3", "arg"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Bool(true)));
        assert_eq!(values.get("output"), Some(&FlagValue::Str("f".into())));
        assert_eq!(values.get("count"), Some(&FlagValue::Int(3)));
        assert_eq!(pos, vec!["arg"]);

        let err = parse_with_env(&flags, &tokens(&["-o"]), false, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidFlagValue(_)));
    }

    #[test]
    fn count_repetition_and_bundling() {
        let flags = vec![Flag::new("verbose", FlagType::Count).short('v')];

        let (_, values) = parse_ok(&flags, &["-v", "-v", "-v"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Count(3)));

        let (_, values) = parse_ok(&flags, &["-vvv"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Count(3)));

        // Mixed bundled and single occurrences accumulate.
        let (_, values) = parse_ok(&flags, &["-vv", "--verbose"]);
        assert_eq!(values.get("verbose"), Some(&FlagValue::Count(3)));
    }

    #[test]
    fn bundling_matches_single_char_long_name() {
        // A count flag whose long name is one character bundles without a
        // declared short.
        let flags = vec![Flag::new("v", FlagType::Count)];
        let (_, values) = parse_ok(&flags, &["-vvv"]);
        assert_eq!(values.get("v"), Some(&FlagValue::Count(3)));
    }

    #[test]
    fn bundling_requires_a_count_short() {
        // -xxx where x is not a count short stays an unknown flag.
        let flags = vec![Flag::new("extra", FlagType::String).short('x')];
        let err = parse_with_env(&flags, &tokens(&["-xxx"]), false, &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag(_)));
    }

    #[test]
    fn slice_accumulation() {
        let flags = vec![Flag::new("tag", FlagType::StringSlice).short('t')];

        let (_, values) = parse_ok(&flags, &["--tag", "a", "--tag", "b"]);
        assert_eq!(
            values.get("tag"),
            Some(&FlagValue::List(vec!["a".into(), "b".into()]))
        );

        let (_, values) = parse_ok(&flags, &["--tag", "a,b"]);
        assert_eq!(
            values.get("tag"),
            Some(&FlagValue::List(vec!["a".into(), "b".into()]))
        );

        let (_, values) = parse_ok(&flags, &["--tag", "a,b", "--tag", "c"]);
        assert_eq!(
            values.get("tag"),
            Some(&FlagValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );

        let (_, values) = parse_ok(&flags, &["-t=x", "--tag=y,z"]);
        assert_eq!(
            values.get("tag"),
            Some(&FlagValue::List(vec!["x".into(), "y".into(), "z".into()]))
        );
    }

    #[test]
    fn precedence_cli_env_default() {
        let flags = vec![
            Flag::new("format", FlagType::String)
                .env("FORMAT")
                .default_value("plain"),
        ];
        let env = vec![("FORMAT".to_string(), "json".to_string())];

        // CLI beats env and default.
        let (_, values) =
            parse_with_env(&flags, &tokens(&["--format", "xml"]), false, &env).unwrap();
        assert_eq!(values.get("format"), Some(&FlagValue::Str("xml".into())));

        // Env beats default.
        let (_, values) = parse_with_env(&flags, &tokens(&[]), false, &env).unwrap();
        assert_eq!(values.get("format"), Some(&FlagValue::Str("json".into())));

        // Default when both are absent.
        let (_, values) = parse_with_env(&flags, &tokens(&[]), false, &[]).unwrap();
        assert_eq!(values.get("format"), Some(&FlagValue::Str("plain".into())));
    }

    #[test]
    fn env_values_are_validated() {
        let flags = vec![Flag::new("port", FlagType::Int).env("PORT")];
        let env = vec![("PORT".to_string(), "not-a-number".to_string())];
        let err = parse_with_env(&flags, &tokens(&[]), false, &env).unwrap_err();
        assert!(matches!(err, Error::InvalidFlagValue(_)));
    }

    #[test]
    fn env_slice_values_comma_split() {
        let flags = vec![Flag::new("tag", FlagType::StringSlice).env("TAGS")];
        let env = vec![("TAGS".to_string(), "a,b,c".to_string())];
        let (_, values) = parse_with_env(&flags, &tokens(&[]), false, &env).unwrap();
        assert_eq!(
            values.get("tag"),
            Some(&FlagValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn required_flag_resolution() {
        let flags = vec![Flag::new("name", FlagType::String).required()];

        let err = parse_with_env(&flags, &tokens(&[]), false, &[]).unwrap_err();
        assert!(matches!(err, Error::RequiredFlag(ref n) if n == "name"));

        // Satisfied via CLI.
        assert!(parse_with_env(&flags, &tokens(&["--name", "x"]), false, &[]).is_ok());

        // Satisfied via env.
        let flags = vec![Flag::new("name", FlagType::String).required().env("NAME")];
        let env = vec![("NAME".to_string(), "x".to_string())];
        assert!(parse_with_env(&flags, &tokens(&[]), false, &env).is_ok());

        // Satisfied via default.
        let flags = vec![
            Flag::new("name", FlagType::String)
                .required()
                .default_value("x"),
        ];
        assert!(parse_with_env(&flags, &tokens(&[]), false, &[]).is_ok());
    }

    #[test]
    fn repeated_scalar_last_wins() {
        let flags = scalar_flags();
        let (_, values) = parse_ok(&flags, &["--name", "a", "--name", "b"]);
        assert_eq!(values.get("name"), Some(&FlagValue::Str("b".into())));
    }

    #[test]
    fn empty_input() {
        let (pos, values) = parse_ok(&scalar_flags(), &[]);
        assert!(pos.is_empty());
        assert!(values.is_empty());
    }
}
