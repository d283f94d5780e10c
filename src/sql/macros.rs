//! Query Macro Engine
//!
//! Expands the fixed macro set the code editor exposes:
//!
//! | Macro | Args | Expands to |
//! |-------|------|------------|
//! | `$__table()` | 0 | quoted table name |
//! | `$__timeFilter(col)` | 1 | inclusive time filter on `col` |
//! | `$__timeGroup(col)` | 1 | bucketing expression on `col` |
//! | `$__timeAlias()` | 0 | quoted time alias |
//! | `$__metricAlias()` | 0 | quoted metric alias |
//!
//! Expansion is one left-to-right pass over the input building a fresh
//! output string; macro output is never re-scanned, so a table name that
//! happens to contain macro syntax stays inert. At each `$__` the macro
//! names are tried in the table's order and must end at an identifier
//! boundary; an unrecognized `$__name` passes through untouched.
//!
//! # Example
//!
//! ```text
//! SELECT $__timeGroup(ts) AS $__timeAlias(), COUNT(*) AS $__metricAlias()
//! FROM $__table()
//! WHERE $__timeFilter(ts)
//! GROUP BY $__timeAlias()
//! ```

use std::time::Duration;

use nom::{
    bytes::complete::take_while,
    character::complete::char,
    sequence::delimited,
    IResult,
};

use crate::request::TimeRange;
use crate::store::TableSchema;

use super::error::{SqlError, SqlResult};
use super::quote_ident;
use super::timeexpr::TimeExpressionBuilder;

/// Macro names with their arities, in match-priority order
const MACROS: &[(&str, usize)] = &[
    ("table", 0),
    ("timeFilter", 1),
    ("timeGroup", 1),
    ("timeAlias", 0),
    ("metricAlias", 0),
];

const MACRO_PREFIX: &str = "$__";

/// Expands macros against one query's table, schema, and time context
///
/// All inputs are injected at construction; the engine holds no state
/// beyond these borrows and can be dropped after [`Self::expand`].
pub struct MacroEngine<'a> {
    table: &'a str,
    schema: &'a TableSchema,
    range: &'a TimeRange,
    bucket: Duration,
    time_alias: &'a str,
    metric_alias: &'a str,
}

impl<'a> MacroEngine<'a> {
    /// Create an engine for one query
    pub fn new(
        table: &'a str,
        schema: &'a TableSchema,
        range: &'a TimeRange,
        bucket: Duration,
        time_alias: &'a str,
        metric_alias: &'a str,
    ) -> Self {
        Self {
            table,
            schema,
            range,
            bucket,
            time_alias,
            metric_alias,
        }
    }

    /// Expand every macro occurrence in `code`
    pub fn expand(&self, code: &str) -> SqlResult<String> {
        let mut out = String::with_capacity(code.len() + 64);
        let mut rest = code;

        while let Some(pos) = rest.find(MACRO_PREFIX) {
            out.push_str(&rest[..pos]);
            let at = &rest[pos..];
            match self.expand_at(at)? {
                Some((rendered, consumed)) => {
                    out.push_str(&rendered);
                    rest = &at[consumed..];
                }
                None => {
                    out.push_str(MACRO_PREFIX);
                    rest = &at[MACRO_PREFIX.len()..];
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Try to expand the macro starting at `at` (which begins with `$__`)
    ///
    /// Returns the rendered text and the number of input bytes consumed, or
    /// `None` when no macro name matches here.
    fn expand_at(&self, at: &str) -> SqlResult<Option<(String, usize)>> {
        let after_prefix = &at[MACRO_PREFIX.len()..];

        for (name, arity) in MACROS {
            if !after_prefix.starts_with(name) {
                continue;
            }
            let after_name = &after_prefix[name.len()..];
            if after_name.chars().next().is_some_and(is_ident_char) {
                continue;
            }

            let full_name = format!("{}{}", MACRO_PREFIX, name);
            let (args, args_len) = if after_name.starts_with('(') {
                match argument_list(after_name) {
                    Ok((rest, args)) => (args, after_name.len() - rest.len()),
                    Err(_) => {
                        return Err(SqlError::MacroUnterminated { name: full_name });
                    }
                }
            } else {
                (Vec::new(), 0)
            };

            if args.len() != *arity {
                return Err(SqlError::MacroArity {
                    name: full_name,
                    expected: *arity,
                    found: args.len(),
                });
            }

            let rendered = self.render(name, &args).map_err(|e| e.in_macro(&full_name))?;
            let consumed = MACRO_PREFIX.len() + name.len() + args_len;
            return Ok(Some((rendered, consumed)));
        }

        Ok(None)
    }

    fn render(&self, name: &str, args: &[String]) -> SqlResult<String> {
        match name {
            "table" => Ok(quote_ident(self.table)),
            "timeFilter" => {
                let builder = TimeExpressionBuilder::new(self.schema, &args[0])?;
                Ok(builder.time_filter_expr(self.range))
            }
            "timeGroup" => {
                let builder = TimeExpressionBuilder::new(self.schema, &args[0])?;
                Ok(builder.time_group_expr(self.bucket))
            }
            "timeAlias" => Ok(quote_ident(self.time_alias)),
            "metricAlias" => Ok(quote_ident(self.metric_alias)),
            other => Err(SqlError::Configuration(format!("unknown macro {}", other))),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a parenthesized argument list: `(a, b)` -> ["a", "b"], `()` -> []
///
/// Arguments cannot nest parentheses; each is whitespace-trimmed and one
/// pair of surrounding quotes is stripped.
fn argument_list(input: &str) -> IResult<&str, Vec<String>> {
    let (rest, inner) = delimited(
        char('('),
        take_while(|c| c != '(' && c != ')'),
        char(')'),
    )(input)?;

    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(clean_argument).collect()
    };
    Ok((rest, args))
}

/// Trim an argument and strip one pair of surrounding quotes
fn clean_argument(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if trimmed.len() >= 2 {
        let first = bytes[0];
        let last = bytes[trimmed.len() - 1];
        if first == last && (first == b'\'' || first == b'"') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
