use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::api::ConversionError;
use crate::constant::HELP_NAME;
use crate::model::SharedFlag;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The ways a parse can abort.
///
/// The first error halts token consumption; there is no retry and no partial
/// recovery. Flag state mutated before the abort is kept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A token shaped like a flag that cannot name one, such as a
    /// one-character long flag (`--x`).
    #[error("malformed flag '{token}'.")]
    MalformedOption {
        /// The offending token, dashes included.
        token: String,
    },

    /// An alias with no registration behind it.
    #[error("unknown flag '{flag}'.")]
    UnknownFlag {
        /// The unrecognized alias, dashes included.
        flag: String,
    },

    /// A value-bearing flag reached the end of the token stream.
    #[error("flag '{flag}' requires a value.")]
    MissingValue {
        /// The starved alias, dashes included.
        flag: String,
    },

    /// A value failed its type-specific literal conversion.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// `--help` was supplied. Not a failure: parsing short-circuits, usage is
    /// rendered, and no error line is emitted.
    #[error("help requested.")]
    HelpRequested,
}

// One left-to-right pass over the token vector. The outer loop consumes at
// least one whole token per iteration; cluster scanning consumes at least one
// character per step, so termination follows from finite input.
pub(crate) struct Scanner<'p, 't> {
    flags: &'p HashMap<String, SharedFlag>,
    positionals: &'p mut Vec<String>,
    tokens: VecDeque<&'t str>,
}

impl<'p, 't> Scanner<'p, 't> {
    pub(crate) fn new(
        flags: &'p HashMap<String, SharedFlag>,
        positionals: &'p mut Vec<String>,
        tokens: &[&'t str],
    ) -> Self {
        Self {
            flags,
            positionals,
            tokens: tokens.iter().copied().collect(),
        }
    }

    pub(crate) fn run(mut self) -> Result<(), ParseError> {
        while let Some(token) = self.tokens.pop_front() {
            if token == "--" {
                #[cfg(feature = "tracing_debug")]
                debug!(
                    "terminator; {} remaining tokens are positional",
                    self.tokens.len()
                );
                self.positionals
                    .extend(self.tokens.drain(..).map(String::from));
                return Ok(());
            } else if token == "-" {
                self.positionals.push(String::from(token));
            } else if token.starts_with('-') {
                self.scan_flag(token)?;
            } else {
                #[cfg(feature = "tracing_debug")]
                debug!("positional '{token}'");
                self.positionals.push(String::from(token));
            }
        }

        Ok(())
    }

    fn scan_flag(&mut self, token: &'t str) -> Result<(), ParseError> {
        match token.strip_prefix("--") {
            Some(body) if !body.is_empty() => self.scan_long(body),
            _ => self.scan_cluster(&token[1..]),
        }
    }

    fn scan_long(&mut self, body: &str) -> Result<(), ParseError> {
        // An empty inline value (`--flag=`) carries no value, exactly like a
        // bare `--flag`.
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) if !value.is_empty() => (name, Some(value)),
            Some((name, _)) => (name, None),
            None => (body, None),
        };

        // Single-character names must use the single-dash form.
        if name.chars().count() == 1 {
            return Err(ParseError::MalformedOption {
                token: format!("--{name}"),
            });
        }

        if name == HELP_NAME {
            return Err(ParseError::HelpRequested);
        }

        let flag = self.flags.get(name).ok_or_else(|| ParseError::UnknownFlag {
            flag: format!("--{name}"),
        })?;

        let value = match inline {
            Some(value) => String::from(value),
            None if flag.borrow().is_bool_flag() => String::from("true"),
            // The next whole token is the value, even if it looks like
            // another flag.
            None => match self.tokens.pop_front() {
                Some(next) => String::from(next),
                None => {
                    return Err(ParseError::MissingValue {
                        flag: format!("--{name}"),
                    })
                }
            },
        };

        #[cfg(feature = "tracing_debug")]
        debug!("long flag '--{name}' takes '{value}'");

        flag.borrow_mut().set(&value)?;
        Ok(())
    }

    fn scan_cluster(&mut self, cluster: &str) -> Result<(), ParseError> {
        for (index, short) in cluster.char_indices() {
            let name = short.to_string();
            let flag = self
                .flags
                .get(name.as_str())
                .ok_or_else(|| ParseError::UnknownFlag {
                    flag: format!("-{short}"),
                })?;

            if flag.borrow().is_bool_flag() {
                #[cfg(feature = "tracing_debug")]
                debug!("cluster boolean '-{short}'");
                flag.borrow_mut().set("true")?;
                continue;
            }

            // The rest of the cluster, when present, is the value verbatim.
            // Either way a value-bearing flag terminates the cluster.
            let rest = &cluster[index + short.len_utf8()..];
            let value = if !rest.is_empty() {
                String::from(rest)
            } else {
                match self.tokens.pop_front() {
                    Some(next) => String::from(next),
                    None => {
                        return Err(ParseError::MissingValue {
                            flag: format!("-{short}"),
                        })
                    }
                }
            };

            #[cfg(feature = "tracing_debug")]
            debug!("cluster flag '-{short}' takes '{value}'");

            flag.borrow_mut().set(&value)?;
            return Ok(());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BoolValue, IntValue, StringValue, StringsValue, Value};
    use crate::model::Flag;
    use crate::test::assert_contains;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn register(
        flags: &mut HashMap<String, SharedFlag>,
        names: &[&str],
        value: impl Value + 'static,
    ) {
        let aliases: Vec<String> = names.iter().map(|name| String::from(*name)).collect();
        let flag = Flag::shared(aliases.clone(), "", Box::new(value));

        for alias in aliases {
            flags.insert(alias, Rc::clone(&flag));
        }
    }

    fn scan(flags: &HashMap<String, SharedFlag>, tokens: &[&str]) -> Result<Vec<String>, ParseError> {
        let mut positionals = Vec::default();
        Scanner::new(flags, &mut positionals, tokens).run()?;
        Ok(positionals)
    }

    #[test]
    fn scan_empty() {
        let flags = HashMap::default();

        let positionals = scan(&flags, empty::slice()).unwrap();

        assert_eq!(positionals, Vec::<String>::default());
    }

    #[rstest]
    #[case(vec!["a"], vec!["a"])]
    #[case(vec!["a", "b", "c"], vec!["a", "b", "c"])]
    #[case(vec!["-"], vec!["-"])]
    #[case(vec!["a", "-", "b"], vec!["a", "-", "b"])]
    #[case(vec![""], vec![""])]
    fn scan_positionals(#[case] tokens: Vec<&str>, #[case] expected: Vec<&str>) {
        let flags = HashMap::default();

        let positionals = scan(&flags, tokens.as_slice()).unwrap();

        assert_eq!(positionals, expected);
    }

    #[test]
    fn scan_terminator() {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&cell)));

        // Execute
        let positionals = scan(&flags, &["-x", "--", "-y", "--zee", "plain"]).unwrap();

        // Verify
        assert_eq!(positionals, vec!["-y", "--zee", "plain"]);
        assert!(*cell.borrow());
    }

    #[rstest]
    #[case(vec!["--verbose"])]
    #[case(vec!["--verbose=true"])]
    #[case(vec!["-v"])]
    fn scan_boolean(#[case] tokens: Vec<&str>) {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(false));
        register(&mut flags, &["v", "verbose"], BoolValue::new(Rc::clone(&cell)));

        // Execute
        let positionals = scan(&flags, tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(positionals, Vec::<String>::default());
        assert!(*cell.borrow());
    }

    #[test]
    fn scan_boolean_keeps_following_token() {
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(false));
        register(&mut flags, &["verbose"], BoolValue::new(Rc::clone(&cell)));

        let positionals = scan(&flags, &["--verbose", "false"]).unwrap();

        // Bare presence means true; the next token stays positional.
        assert!(*cell.borrow());
        assert_eq!(positionals, vec!["false"]);
    }

    #[rstest]
    #[case(vec!["--name", "foo"], "foo")]
    #[case(vec!["--name=foo"], "foo")]
    #[case(vec!["--name=foo=bar"], "foo=bar")]
    #[case(vec!["--name", "--other"], "--other")]
    #[case(vec!["--name=", "foo"], "foo")]
    fn scan_long_value(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(String::default()));
        register(&mut flags, &["name"], StringValue::new(Rc::clone(&cell)));

        // Execute
        let positionals = scan(&flags, tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(positionals, Vec::<String>::default());
        assert_eq!(*cell.borrow(), expected);
    }

    #[rstest]
    #[case(vec!["-sfoo"], "foo")]
    #[case(vec!["-s", "foo"], "foo")]
    #[case(vec!["-s", "-x"], "-x")]
    #[case(vec!["-s=123"], "=123")]
    fn scan_cluster_value(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(String::default()));
        register(&mut flags, &["s"], StringValue::new(Rc::clone(&cell)));

        // Execute
        let positionals = scan(&flags, tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(positionals, Vec::<String>::default());
        assert_eq!(*cell.borrow(), expected);
    }

    #[test]
    fn scan_cluster_booleans() {
        // Setup
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        let y = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));
        register(&mut flags, &["y"], BoolValue::new(Rc::clone(&y)));

        // Execute
        scan(&flags, &["-xy"]).unwrap();

        // Verify
        assert!(*x.borrow());
        assert!(*y.borrow());
    }

    #[test]
    fn scan_cluster_mixed() {
        // Setup
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        let s = Rc::new(RefCell::new(String::default()));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));
        register(&mut flags, &["s"], StringValue::new(Rc::clone(&s)));

        // Execute
        scan(&flags, &["-xsfoo"]).unwrap();

        // Verify
        assert!(*x.borrow());
        assert_eq!(*s.borrow(), "foo");
    }

    #[test]
    fn scan_cluster_value_swallows_remainder() {
        // Setup
        let mut flags = HashMap::default();
        let s = Rc::new(RefCell::new(String::default()));
        let x = Rc::new(RefCell::new(false));
        register(&mut flags, &["s"], StringValue::new(Rc::clone(&s)));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));

        // Execute
        scan(&flags, &["-sx"]).unwrap();

        // Verify: 'x' was the value, not a flag.
        assert_eq!(*s.borrow(), "x");
        assert!(!*x.borrow());
    }

    #[test]
    fn scan_list_accumulates_across_forms() {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(Vec::default()));
        register(&mut flags, &["s", "str"], StringsValue::new(Rc::clone(&cell)));

        // Execute
        scan(&flags, &["-sfoo", "-s", "bar", "--str=baz", "--str", "qux"]).unwrap();

        // Verify
        assert_eq!(*cell.borrow(), vec!["foo", "bar", "baz", "qux"]);
    }

    #[rstest]
    #[case(vec!["--nope"], "--nope")]
    #[case(vec!["--nope=1"], "--nope")]
    #[case(vec!["-q"], "-q")]
    #[case(vec!["-xq"], "-q")]
    fn scan_unknown(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));

        // Execute
        let error = scan(&flags, tokens.as_slice()).unwrap_err();

        // Verify
        assert_eq!(
            error,
            ParseError::UnknownFlag {
                flag: String::from(expected)
            }
        );
        assert_contains!(error.to_string(), expected);
    }

    #[test]
    fn scan_unknown_keeps_earlier_effects() {
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));

        assert_matches!(scan(&flags, &["-xq"]), Err(ParseError::UnknownFlag { .. }));

        // No rollback: the booleans matched before the abort stay set.
        assert!(*x.borrow());
    }

    #[rstest]
    #[case(vec!["--name"], "--name")]
    #[case(vec!["--name="], "--name")]
    #[case(vec!["-s"], "-s")]
    #[case(vec!["-xs"], "-s")]
    fn scan_missing_value(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        let s = Rc::new(RefCell::new(String::default()));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));
        register(&mut flags, &["s", "name"], StringValue::new(Rc::clone(&s)));

        // Execute
        let error = scan(&flags, tokens.as_slice()).unwrap_err();

        // Verify
        assert_eq!(
            error,
            ParseError::MissingValue {
                flag: String::from(expected)
            }
        );
    }

    #[rstest]
    #[case(vec!["--h"])]
    #[case(vec!["--h=1"])]
    #[case(vec!["--x"])]
    fn scan_malformed_long(#[case] tokens: Vec<&str>) {
        // Single-character names must use the single-dash form, even when the
        // alias exists.
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));

        let error = scan(&flags, tokens.as_slice()).unwrap_err();

        assert_matches!(error, ParseError::MalformedOption { .. });
        assert!(!*x.borrow());
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["--help", "anything"])]
    #[case(vec!["--help=1"])]
    fn scan_help(#[case] tokens: Vec<&str>) {
        let flags = HashMap::default();

        let error = scan(&flags, tokens.as_slice()).unwrap_err();

        assert_eq!(error, ParseError::HelpRequested);
    }

    #[test]
    fn scan_help_shadows_registered_alias() {
        // The literal `--help` wins over a registered `help` alias.
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(false));
        register(&mut flags, &["help"], BoolValue::new(Rc::clone(&cell)));

        let error = scan(&flags, &["--help"]).unwrap_err();

        assert_eq!(error, ParseError::HelpRequested);
        assert!(!*cell.borrow());
    }

    #[rstest]
    #[case(vec!["--num", "blah"])]
    #[case(vec!["--num=blah"])]
    #[case(vec!["-nblah"])]
    #[case(vec!["-n", "blah"])]
    fn scan_conversion_error(#[case] tokens: Vec<&str>) {
        // Setup
        let mut flags = HashMap::default();
        let cell = Rc::new(RefCell::new(isize::default()));
        register(&mut flags, &["n", "num"], IntValue::new(Rc::clone(&cell)));

        // Execute
        let error = scan(&flags, tokens.as_slice()).unwrap_err();

        // Verify
        assert_matches!(error, ParseError::Conversion(_));
        assert_contains!(error.to_string(), "blah");
        assert_eq!(*cell.borrow(), 0);
    }

    #[test]
    fn scan_error_halts_consumption() {
        // Setup
        let mut flags = HashMap::default();
        let x = Rc::new(RefCell::new(false));
        register(&mut flags, &["x"], BoolValue::new(Rc::clone(&x)));

        let mut positionals = Vec::default();

        // Execute
        let result = Scanner::new(&flags, &mut positionals, &["a", "-q", "b", "-x"]).run();

        // Verify: nothing after the failing token was touched.
        assert_matches!(result, Err(ParseError::UnknownFlag { .. }));
        assert_eq!(positionals, vec!["a"]);
        assert!(!*x.borrow());
    }
}
