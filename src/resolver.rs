//! Turns a lookup request into display text.
//!
//! Resolution order:
//! 1. find the message by `(context, source, disambiguator)`
//! 2. fall back to the source text when the message is missing, retired, or
//!    unfinished (depending on [`UnfinishedPolicy`])
//! 3. pick the plural variant for the request's count
//! 4. substitute `%1`..`%99` and `%n`

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::{
    Message,
    MessageStatus,
    Translation,
};
use crate::interpolate::{
    InterpolationError,
    InterpolationMode,
    Interpolator,
    highest_placeholder,
};
use crate::store::LoadedCatalog;

/// How to treat messages marked `type="unfinished"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnfinishedPolicy {
    /// Show the source text.
    #[default]
    FallbackToSource,
    /// Show the draft translation when it is not empty.
    UseTranslation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverSettings {
    pub unfinished: UnfinishedPolicy,
    pub interpolation: InterpolationMode,
}

/// Mistakes at the call site. These are bugs in the caller, never catalog problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("plural message '{source_text}' in context '{context}' needs a count")]
    MissingCount { context: String, source_text: String },

    #[error("'{source_text}' uses %{expected} but {provided} argument(s) were given")]
    TooFewArguments { source_text: String, expected: usize, provided: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// A single UI string request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRequest<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub disambiguator: Option<&'a str>,
    /// Required for plural messages.
    pub count: Option<u64>,
    /// Values for `%1`, `%2`, ...
    pub args: &'a [&'a str],
}

impl<'a> MessageRequest<'a> {
    #[must_use]
    pub const fn new(context: &'a str, source: &'a str) -> Self {
        Self { context, source, disambiguator: None, count: None, args: &[] }
    }

    #[must_use]
    pub const fn disambiguator(mut self, disambiguator: &'a str) -> Self {
        self.disambiguator = Some(disambiguator);
        self
    }

    #[must_use]
    pub const fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub const fn args(mut self, args: &'a [&'a str]) -> Self {
        self.args = args;
        self
    }
}

/// Stateless resolver; cheap to copy and safe to share between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    /// Fallback and interpolation behavior.
    settings: ResolverSettings,
}

impl Resolver {
    #[must_use]
    pub const fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(self) -> ResolverSettings {
        self.settings
    }

    /// Resolves `request` against `catalog` to the final display text.
    ///
    /// # Errors
    /// - [`ArgumentError::MissingCount`] for a plural message without a count
    /// - [`ArgumentError::TooFewArguments`] when the source uses more placeholders than `args`
    /// - [`InterpolationError`] only in strict interpolation mode
    pub fn resolve(
        self,
        catalog: &LoadedCatalog,
        request: &MessageRequest<'_>,
    ) -> Result<String, ResolveError> {
        let template = self.template(catalog, request)?;
        self.finish(request.source, template, request.args, request.count)
    }

    /// The text [`Resolver::resolve`] would interpolate, without substituting anything.
    ///
    /// # Errors
    /// [`ArgumentError::MissingCount`] for a plural message without a count.
    pub fn template<'a>(
        self,
        catalog: &'a LoadedCatalog,
        request: &MessageRequest<'a>,
    ) -> Result<&'a str, ArgumentError> {
        let message = catalog.lookup(request.context, request.source, request.disambiguator);
        if message.is_none() {
            tracing::debug!(
                context = request.context,
                source = request.source,
                disambiguator = request.disambiguator,
                "No translation, using source"
            );
        }
        self.choose(catalog, request.context, request.source, message, request.count)
    }

    /// Resolves a message by its id.
    ///
    /// An unknown id resolves to the id itself; otherwise the message's source
    /// is the fallback text.
    ///
    /// # Errors
    /// Same as [`Resolver::resolve`].
    pub fn resolve_id(
        self,
        catalog: &LoadedCatalog,
        id: &str,
        count: Option<u64>,
        args: &[&str],
    ) -> Result<String, ResolveError> {
        let found = catalog
            .index()
            .find_id(id)
            .and_then(|position| catalog.catalog().message(position));
        let context = found.map_or("", |(context, _)| context.name.as_str());
        let message = found.map(|(_, message)| message);
        let source = message.map_or(id, |message| message.source.as_str());
        let template = self.choose(catalog, context, source, message, count)?;
        self.finish(source, template, args, count)
    }

    /// Picks the text to interpolate: translation, plural variant or source.
    fn choose<'a>(
        self,
        catalog: &'a LoadedCatalog,
        context: &str,
        source: &'a str,
        message: Option<&'a Message>,
        count: Option<u64>,
    ) -> Result<&'a str, ArgumentError> {
        let Some(message) = message else {
            return Ok(source);
        };

        if message.is_plural() && count.is_none() {
            return Err(ArgumentError::MissingCount {
                context: context.to_string(),
                source_text: message.source.clone(),
            });
        }

        match message.status {
            MessageStatus::Obsolete | MessageStatus::Vanished => return Ok(source),
            MessageStatus::Unfinished
                if self.settings.unfinished == UnfinishedPolicy::FallbackToSource =>
            {
                return Ok(source);
            }
            MessageStatus::Unfinished | MessageStatus::Translated => {}
        }

        let text = match &message.translation {
            Translation::Single(text) => text.as_str(),
            Translation::Plural(forms) => {
                let count = count.unwrap_or_default();
                let selected = catalog.plural_rule().select(count);
                let last = forms.len().saturating_sub(1);
                if selected > last {
                    tracing::warn!(
                        source,
                        count,
                        selected,
                        available = forms.len(),
                        "Catalog has fewer plural forms than its locale needs, using the last one"
                    );
                }
                forms.get(selected.min(last)).map_or("", String::as_str)
            }
        };

        if text.is_empty() { Ok(source) } else { Ok(text) }
    }

    /// Checks arity against the source and interpolates.
    fn finish(
        self,
        source: &str,
        template: &str,
        args: &[&str],
        count: Option<u64>,
    ) -> Result<String, ResolveError> {
        let expected = highest_placeholder(source);
        if args.len() < expected {
            return Err(ArgumentError::TooFewArguments {
                source_text: source.to_string(),
                expected,
                provided: args.len(),
            }
            .into());
        }

        Ok(Interpolator::new(self.settings.interpolation).interpolate_with_count(
            template,
            args,
            count,
        )?)
    }
}
