//! Flag metadata and value typing.
//!
//! A [`Flag`] is a plain serializable record describing one command-line
//! option: its name, optional one-character shorthand, value type, and the
//! default/env fallbacks the parser resolves when the flag is not supplied
//! on the command line. Parsed values are stored as tagged [`FlagValue`]s,
//! so accessors never re-parse strings.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The value type of a command flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagType {
    /// Free-form string value (the default).
    #[default]
    String,
    /// Boolean; accepts case-insensitive `true`, `false`, `1`, `0`.
    Bool,
    /// Signed base-10 integer.
    Int,
    /// Base-10 floating point number.
    Float,
    /// Repeatable string flag collecting multiple values, via repetition
    /// (`--tag a --tag b`) or commas (`--tag a,b`).
    StringSlice,
    /// Counter incremented by repetition (`-vvv` counts 3).
    Count,
}

impl std::fmt::Display for FlagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FlagType::String => "string",
            FlagType::Bool => "bool",
            FlagType::Int => "int",
            FlagType::Float => "float",
            FlagType::StringSlice => "[]string",
            FlagType::Count => "count",
        };
        f.write_str(s)
    }
}

/// A typed value resolved for one flag during parsing.
///
/// Slice flags accumulate into `List` and count flags into `Count`, which
/// removes any need for a reserved separator inside a string encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
    Count(u64),
}

/// Declaration of a single command-line flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Flag {
    pub(crate) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) short: Option<char>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) kind: FlagType,
    #[serde(default)]
    pub(crate) required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) env: Option<String>,
}

impl Flag {
    /// Create a flag with the given long name and value type.
    pub fn new(name: impl Into<String>, kind: FlagType) -> Self {
        Self {
            name: name.into(),
            kind,
            ..<Self as Default>::default()
        }
    }

    /// Set the single-character shorthand (e.g. `'v'` for `-v`).
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the help text shown in flag listings.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default adopted when neither argv nor env supplies a value.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the environment variable consulted when the flag is absent from
    /// argv. Env beats default; argv beats both.
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env = Some(var.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_char(&self) -> Option<char> {
        self.short
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> FlagType {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Check that `value` is valid for this flag's type.
    pub fn validate(&self, value: &str) -> Result<(), Error> {
        self.parse_value(value).map(|_| ())
    }

    /// Parse `value` into a typed [`FlagValue`] according to this flag's
    /// type, or return [`Error::InvalidFlagValue`] naming the flag and the
    /// offending literal.
    ///
    /// `Count` values are synthesized by the parser from repetition, never
    /// taken verbatim from user text; parsing one here only happens for a
    /// declared default.
    pub fn parse_value(&self, value: &str) -> Result<FlagValue, Error> {
        match self.kind {
            FlagType::String => Ok(FlagValue::Str(value.to_string())),
            FlagType::StringSlice => Ok(FlagValue::List(split_list(value))),
            FlagType::Bool => parse_bool(value)
                .map(FlagValue::Bool)
                .ok_or_else(|| Error::bad_value(&self.name, "bool", value)),
            FlagType::Int => value
                .parse::<i64>()
                .map(FlagValue::Int)
                .map_err(|_| Error::bad_value(&self.name, "int", value)),
            FlagType::Float => value
                .parse::<f64>()
                .map(FlagValue::Float)
                .map_err(|_| Error::bad_value(&self.name, "float", value)),
            FlagType::Count => value
                .parse::<u64>()
                .map(FlagValue::Count)
                .map_err(|_| Error::bad_value(&self.name, "count", value)),
        }
    }
}

/// Parse the boolean literals accepted on the command line.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}

/// Split a comma-separated slice value into its elements.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

/// Look up a flag by long name, or by short alias when `name` is a single
/// character.
pub(crate) fn find_flag<'a>(flags: &'a [Flag], name: &str) -> Option<&'a Flag> {
    let mut chars = name.chars();
    let short = match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };
    flags
        .iter()
        .find(|f| f.name == name || (short.is_some() && f.short == short))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_by_type() {
        let cases: &[(&str, FlagType, &str, bool)] = &[
            ("b", FlagType::Bool, "true", true),
            ("b", FlagType::Bool, "FALSE", true),
            ("b", FlagType::Bool, "1", true),
            ("b", FlagType::Bool, "0", true),
            ("b", FlagType::Bool, "yes", false),
            ("i", FlagType::Int, "42", true),
            ("i", FlagType::Int, "-10", true),
            ("i", FlagType::Int, "3.14", false),
            ("f", FlagType::Float, "3.14", true),
            ("f", FlagType::Float, "-0.5", true),
            ("f", FlagType::Float, "abc", false),
            ("s", FlagType::String, "anything", true),
            ("s", FlagType::String, "", true),
            ("t", FlagType::StringSlice, "a,b,c", true),
        ];
        for (name, kind, value, ok) in cases {
            let flag = Flag::new(*name, *kind);
            let result = flag.validate(value);
            if *ok {
                assert!(result.is_ok(), "{kind:?} should accept {value:?}");
            } else {
                assert!(
                    matches!(result, Err(Error::InvalidFlagValue(_))),
                    "{kind:?} should reject {value:?}"
                );
            }
        }
    }

    #[test]
    fn parses_typed_values() {
        assert_eq!(
            Flag::new("i", FlagType::Int).parse_value("-7").unwrap(),
            FlagValue::Int(-7)
        );
        assert_eq!(
            Flag::new("b", FlagType::Bool).parse_value("0").unwrap(),
            FlagValue::Bool(false)
        );
        assert_eq!(
            Flag::new("t", FlagType::StringSlice)
                .parse_value("a,b")
                .unwrap(),
            FlagValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn type_display_matches_help_vocabulary() {
        assert_eq!(FlagType::String.to_string(), "string");
        assert_eq!(FlagType::Bool.to_string(), "bool");
        assert_eq!(FlagType::Int.to_string(), "int");
        assert_eq!(FlagType::Float.to_string(), "float");
        assert_eq!(FlagType::StringSlice.to_string(), "[]string");
        assert_eq!(FlagType::Count.to_string(), "count");
    }

    #[test]
    fn finds_by_name_or_short() {
        let flags = vec![
            Flag::new("verbose", FlagType::Count).short('v'),
            Flag::new("output", FlagType::String).short('o'),
        ];
        assert_eq!(find_flag(&flags, "verbose").unwrap().name(), "verbose");
        assert_eq!(find_flag(&flags, "o").unwrap().name(), "output");
        assert!(find_flag(&flags, "missing").is_none());
        // Multi-character tokens never match a short alias.
        assert!(find_flag(&flags, "vv").is_none());
    }

    #[test]
    fn metadata_serializes_kebab_case() {
        let flag = Flag::new("log-level", FlagType::String)
            .short('l')
            .default_value("info")
            .env("LOG_LEVEL")
            .help("Log verbosity");
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["name"], "log-level");
        assert_eq!(json["kind"], "string");
        assert_eq!(json["default"], "info");
        assert_eq!(json["env"], "LOG_LEVEL");
    }
}
