//! Dimension Filter Compiler
//!
//! Compiles one structured dimension filter into a boolean SQL predicate.
//! Anything the compiler cannot make sense of (unknown operator, empty
//! value list, blank column) renders the tautology `1=1` instead of
//! failing; dashboards send half-edited filters constantly and a broken
//! row must never take the panel down.

use crate::request::DimensionFilter;

use super::quote_ident;

/// Predicate rendered for filters that cannot be compiled
pub const TAUTOLOGY: &str = "1=1";

/// Operators a dimension filter can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Substring containment
    Contains,
    /// Negated substring containment
    NotContains,
    /// SQL LIKE pattern
    Like,
    /// Negated SQL LIKE pattern
    NotLike,
}

impl FilterOperator {
    /// Parse an operator wire token
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "contains" => Some(Self::Contains),
            "not-contains" | "not contains" | "notcontains" => Some(Self::NotContains),
            "like" => Some(Self::Like),
            "not-like" | "not like" | "notlike" => Some(Self::NotLike),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Contains => write!(f, "contains"),
            Self::NotContains => write!(f, "not contains"),
            Self::Like => write!(f, "like"),
            Self::NotLike => write!(f, "not like"),
        }
    }
}

/// Compile one dimension filter into a boolean predicate
///
/// A single value renders bare (`"dim" = 'v'`); multiple values OR-combine
/// inside parentheses. Value expressions arrive pre-quoted from the editor
/// and are rendered verbatim.
pub fn compile_dimension_filter(filter: &DimensionFilter) -> String {
    let op = match FilterOperator::from_token(&filter.operator) {
        Some(op) => op,
        None => return TAUTOLOGY.to_string(),
    };

    if filter.column_name.trim().is_empty() {
        return TAUTOLOGY.to_string();
    }

    let values: Vec<&str> = filter
        .value_exprs
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return TAUTOLOGY.to_string();
    }

    let column = quote_ident(filter.column_name.trim());
    let terms: Vec<String> = values
        .iter()
        .map(|v| format!("{} {} {}", column, op, v))
        .collect();

    if terms.len() == 1 {
        terms.into_iter().next().unwrap_or_else(|| TAUTOLOGY.to_string())
    } else {
        format!("({})", terms.join(" OR "))
    }
}
