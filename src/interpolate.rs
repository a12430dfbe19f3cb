//! Positional placeholder substitution.
//!
//! `%1` to `%99` reference arguments 1-based, `%n` is replaced with the plural
//! count when one is given. A placeholder takes at most two digits, as in Qt's
//! `QString::arg`, so `%123` is `%12` followed by a literal `3`. Everything
//! else, including `%0` and a `%` not followed by a digit, is copied verbatim.
//! Substituted text is never scanned again.

use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// What to do with a placeholder that has no matching argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolationMode {
    /// Substitute an empty string and log a warning.
    #[default]
    Lenient,
    /// Fail with [`InterpolationError::ArgumentOutOfRange`].
    Strict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("placeholder %{index} has no argument ({provided} provided)")]
    ArgumentOutOfRange { index: usize, provided: usize },
}

/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Literal text, copied as is.
    Text(&'a str),
    /// `%1`..`%99`, 1-based.
    Arg(usize),
    /// `%n`
    Count,
}

/// Splits a template into literal text and placeholders.
#[derive(Debug, Clone)]
struct Tokens<'a> {
    /// Unconsumed input.
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    /// Tokenize `template`.
    const fn new(template: &'a str) -> Self {
        Self { rest: template }
    }

    /// Consumes and returns the next `len` bytes.
    fn advance(&mut self, len: usize) -> &'a str {
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        head
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find('%') {
            None => Some(Token::Text(self.advance(self.rest.len()))),
            Some(0) => {
                let bytes = self.rest.as_bytes();
                match (bytes.get(1).copied(), bytes.get(2).copied()) {
                    (Some(first @ b'1'..=b'9'), second) => {
                        let mut index = usize::from(first - b'0');
                        let mut len = 2;
                        if let Some(second @ b'0'..=b'9') = second {
                            index = index * 10 + usize::from(second - b'0');
                            len = 3;
                        }
                        self.advance(len);
                        Some(Token::Arg(index))
                    }
                    (Some(b'n'), _) => {
                        self.advance(2);
                        Some(Token::Count)
                    }
                    _ => Some(Token::Text(self.advance(1))),
                }
            }
            Some(position) => Some(Token::Text(self.advance(position))),
        }
    }
}

/// Substitutes arguments into templates according to an [`InterpolationMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interpolator {
    /// Handling of missing arguments.
    mode: InterpolationMode,
}

impl Interpolator {
    #[must_use]
    pub const fn new(mode: InterpolationMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(self) -> InterpolationMode {
        self.mode
    }

    /// Replace `%1`..`%99` in `template` with `args`.
    ///
    /// `%n` is left as is.
    ///
    /// # Errors
    /// [`InterpolationError::ArgumentOutOfRange`] in strict mode when a
    /// placeholder exceeds `args.len()`.
    pub fn interpolate<S: AsRef<str>>(
        self,
        template: &str,
        args: &[S],
    ) -> Result<String, InterpolationError> {
        self.interpolate_with_count(template, args, None)
    }

    /// Like [`Interpolator::interpolate`], also replacing `%n` with `count`.
    ///
    /// # Errors
    /// See [`Interpolator::interpolate`].
    pub fn interpolate_with_count<S: AsRef<str>>(
        self,
        template: &str,
        args: &[S],
        count: Option<u64>,
    ) -> Result<String, InterpolationError> {
        let mut out = String::with_capacity(template.len());

        for token in Tokens::new(template) {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Count => match count {
                    Some(count) => out.push_str(&count.to_string()),
                    None => out.push_str("%n"),
                },
                Token::Arg(index) => {
                    if let Some(arg) = index.checked_sub(1).and_then(|i| args.get(i)) {
                        out.push_str(arg.as_ref());
                        continue;
                    }
                    let error =
                        InterpolationError::ArgumentOutOfRange { index, provided: args.len() };
                    match self.mode {
                        InterpolationMode::Strict => return Err(error),
                        InterpolationMode::Lenient => {
                            tracing::warn!(template, %error, "Substituting empty string");
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Positional placeholder numbers used in `template`.
#[must_use]
pub fn placeholders(template: &str) -> BTreeSet<usize> {
    Tokens::new(template)
        .filter_map(|token| match token {
            Token::Arg(index) => Some(index),
            Token::Text(_) | Token::Count => None,
        })
        .collect()
}

/// Highest positional placeholder in `template`, 0 when there is none.
#[must_use]
pub fn highest_placeholder(template: &str) -> usize {
    placeholders(template).last().copied().unwrap_or(0)
}

/// Whether `template` contains `%n`.
#[must_use]
pub fn uses_count(template: &str) -> bool {
    Tokens::new(template).any(|token| token == Token::Count)
}
