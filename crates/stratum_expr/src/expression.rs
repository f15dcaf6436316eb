//! Reference expressions: literal text interleaved with deferred references.
//!
//! An expression is built once, while the application model is described, and
//! then projected in two independent ways:
//!
//! - [`ReferenceExpression::to_manifest_expression`] renders the symbolic
//!   deployment-time form. Synchronous, no I/O, safe before deployment.
//! - [`ValueProvider::resolve_value`] resolves every embedded reference, in
//!   order, and concatenates the results. Asynchronous, I/O-bound.
//!
//! # Example
//!
//! ```
//! use stratum_expr::{ExpressionError, ManifestExpressionProvider, ReferenceExpression, Referenceable};
//!
//! struct Endpoint;
//!
//! impl ManifestExpressionProvider for Endpoint {
//!     fn manifest_expression(&self) -> Result<String, ExpressionError> {
//!         Ok("{api.outputs.endpoint}".to_string())
//!     }
//! }
//!
//! impl Referenceable for Endpoint {
//!     fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
//!         Some(self)
//!     }
//! }
//!
//! let expr = ReferenceExpression::builder()
//!     .literal("Endpoint=")
//!     .reference(Endpoint)
//!     .literal(";Timeout=30")
//!     .build()?;
//!
//! assert_eq!(
//!     expr.to_manifest_expression()?,
//!     "Endpoint={api.outputs.endpoint};Timeout=30"
//! );
//! # Ok::<(), ExpressionError>(())
//! ```

use crate::context::ResolveContext;
use crate::error::{ExpressionError, ResolutionError};
use crate::provider::{ManifestExpressionProvider, Referenceable, ValueProvider};
use async_trait::async_trait;
use core::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ─────────────────────────────────────────────────────────────────────────────
// Segment
// ─────────────────────────────────────────────────────────────────────────────

/// One piece of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text emitted verbatim by both projections.
    Literal(String),
    /// Placeholder for the argument at this index.
    Argument(usize),
}

// ─────────────────────────────────────────────────────────────────────────────
// ReferenceExpression
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable sequence of literal text and references.
///
/// Arguments are the distinct references of the expression. A placeholder may
/// repeat an argument (see [`format`](Self::format)); each argument is still
/// resolved at most once per [`resolve_value`](ValueProvider::resolve_value)
/// call.
#[derive(Clone, Default)]
pub struct ReferenceExpression {
    segments: Vec<Segment>,
    arguments: Vec<Arc<dyn Referenceable>>,
}

impl ReferenceExpression {
    /// Starts building an expression.
    #[must_use]
    pub fn builder() -> ReferenceExpressionBuilder {
        ReferenceExpressionBuilder::default()
    }

    /// Creates an empty expression.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an expression holding a single literal.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(text.into())],
            arguments: Vec::new(),
        }
    }

    /// Creates an expression holding a single reference that statically
    /// supports both capabilities.
    #[must_use]
    pub fn of<R>(reference: R) -> Self
    where
        R: Referenceable + ValueProvider + ManifestExpressionProvider,
    {
        Self {
            segments: vec![Segment::Argument(0)],
            arguments: vec![Arc::new(reference)],
        }
    }

    /// Creates an expression holding a single reference.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::NotManifestRepresentable`] if `reference`
    /// supports neither capability.
    pub fn from_reference<R: Referenceable>(reference: R) -> Result<Self, ExpressionError> {
        Self::builder().reference(reference).build()
    }

    /// Parses a composite format string with `{N}` placeholders.
    ///
    /// `{{` and `}}` produce literal braces. Every argument must be used at
    /// least once; an argument may be used more than once.
    ///
    /// ```
    /// use stratum_expr::{ReferenceExpression, Segment};
    ///
    /// let expr = ReferenceExpression::format("{{literal}}", Vec::new()).unwrap();
    /// assert_eq!(expr.segments(), &[Segment::Literal("{literal}".into())]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] for unbalanced braces, malformed or
    /// out-of-range placeholders, unused arguments, or an argument with
    /// neither capability.
    pub fn format(
        format: &str,
        arguments: Vec<Arc<dyn Referenceable>>,
    ) -> Result<Self, ExpressionError> {
        for (index, argument) in arguments.iter().enumerate() {
            check_capabilities(index, argument.as_ref())?;
        }

        let segments = parse_format(format, arguments.len())?;

        let mut used = vec![false; arguments.len()];
        for segment in &segments {
            if let Segment::Argument(index) = segment {
                used[*index] = true;
            }
        }
        if let Some(index) = used.iter().position(|used| !used) {
            return Err(ExpressionError::UnusedArgument { index });
        }

        Ok(Self {
            segments,
            arguments,
        })
    }

    /// Returns the segments in declaration order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the distinct references, in the order they were added.
    #[must_use]
    pub fn arguments(&self) -> &[Arc<dyn Referenceable>] {
        &self.arguments
    }

    /// Returns `true` if the expression has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends `other` after `self`.
    #[must_use]
    pub fn concat(mut self, other: ReferenceExpression) -> Self {
        let offset = self.arguments.len();
        self.segments
            .extend(other.segments.into_iter().map(|segment| match segment {
                Segment::Argument(index) => Segment::Argument(index + offset),
                literal @ Segment::Literal(_) => literal,
            }));
        self.arguments.extend(other.arguments);
        self
    }

    /// Renders the symbolic deployment-time form.
    ///
    /// Literals are emitted verbatim and references as their manifest
    /// expression. Performs no I/O and is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::NotManifestRepresentable`] if an argument
    /// only has a runtime value.
    pub fn to_manifest_expression(&self) -> Result<String, ExpressionError> {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Argument(index) => {
                    let argument = &self.arguments[*index];
                    let provider = argument.as_manifest_provider().ok_or_else(|| {
                        ExpressionError::NotManifestRepresentable {
                            index: *index,
                            reference: argument.describe(),
                        }
                    })?;
                    rendered.push_str(&provider.manifest_expression()?);
                }
            }
        }
        Ok(rendered)
    }
}

impl fmt::Debug for ReferenceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<String> = self.arguments.iter().map(|a| a.describe()).collect();
        f.debug_struct("ReferenceExpression")
            .field("segments", &self.segments)
            .field("arguments", &arguments)
            .finish()
    }
}

impl From<&str> for ReferenceExpression {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for ReferenceExpression {
    fn from(text: String) -> Self {
        Self::literal(text)
    }
}

#[async_trait]
impl ValueProvider for ReferenceExpression {
    async fn resolve_value(
        &self,
        ctx: &ResolveContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ResolutionError> {
        tracing::debug!(
            segments = self.segments.len(),
            arguments = self.arguments.len(),
            "resolving reference expression"
        );

        let mut resolved: Vec<Option<String>> = vec![None; self.arguments.len()];
        let mut value = String::new();

        for segment in &self.segments {
            if cancel.is_cancelled() {
                return Err(ResolutionError::Cancelled);
            }

            match segment {
                Segment::Literal(text) => value.push_str(text),
                Segment::Argument(index) => {
                    if resolved[*index].is_none() {
                        let argument = &self.arguments[*index];
                        let provider = argument.as_value_provider().ok_or_else(|| {
                            ResolutionError::NotResolvable {
                                reference: argument.describe(),
                            }
                        })?;

                        tracing::trace!(index, reference = %argument.describe(), "resolving argument");
                        resolved[*index] = Some(provider.resolve_value(ctx, cancel).await?);
                    }
                    if let Some(argument_value) = &resolved[*index] {
                        value.push_str(argument_value);
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }
        Ok(value)
    }
}

impl ManifestExpressionProvider for ReferenceExpression {
    fn manifest_expression(&self) -> Result<String, ExpressionError> {
        self.to_manifest_expression()
    }
}

impl Referenceable for ReferenceExpression {
    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }

    fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
        Some(self)
    }

    fn describe(&self) -> String {
        self.to_manifest_expression()
            .unwrap_or_else(|_| "<runtime expression>".to_string())
    }
}

impl serde::Serialize for ReferenceExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let rendered = self
            .to_manifest_expression()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&rendered)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReferenceExpressionBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`ReferenceExpression`].
///
/// Pieces are kept in the order given; nothing is reordered or deduplicated.
/// The first composition error is reported by [`build`](Self::build).
#[derive(Default)]
pub struct ReferenceExpressionBuilder {
    expression: ReferenceExpression,
    error: Option<ExpressionError>,
}

impl ReferenceExpressionBuilder {
    /// Appends literal text. Empty text is skipped.
    #[must_use]
    pub fn literal(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.expression.segments.push(Segment::Literal(text));
        }
        self
    }

    /// Appends a reference.
    #[must_use]
    pub fn reference<R: Referenceable>(self, reference: R) -> Self {
        self.shared(Arc::new(reference))
    }

    /// Appends an already shared reference.
    #[must_use]
    pub fn shared(mut self, reference: Arc<dyn Referenceable>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let index = self.expression.arguments.len();
        if let Err(err) = check_capabilities(index, reference.as_ref()) {
            self.error = Some(err);
            return self;
        }

        self.expression.segments.push(Segment::Argument(index));
        self.expression.arguments.push(reference);
        self
    }

    /// Appends the pieces of another expression inline.
    #[must_use]
    pub fn expression(mut self, other: ReferenceExpression) -> Self {
        let expression = core::mem::take(&mut self.expression);
        self.expression = expression.concat(other);
        self
    }

    /// Finishes the expression.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::NotManifestRepresentable`] if any reference
    /// supports neither capability.
    pub fn build(self) -> Result<ReferenceExpression, ExpressionError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.expression),
        }
    }
}

fn check_capabilities(index: usize, reference: &dyn Referenceable) -> Result<(), ExpressionError> {
    if reference.as_value_provider().is_none() && reference.as_manifest_provider().is_none() {
        return Err(ExpressionError::NotManifestRepresentable {
            index,
            reference: reference.describe(),
        });
    }
    Ok(())
}

/// Splits a composite format string into segments.
fn parse_format(format: &str, argument_count: usize) -> Result<Vec<Segment>, ExpressionError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = format.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut digits = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    digits.push(next);
                }

                if !closed {
                    return Err(ExpressionError::UnbalancedBrace {
                        format: format.to_string(),
                        position,
                    });
                }

                let index = parse_index(&digits).ok_or_else(|| {
                    ExpressionError::InvalidPlaceholder {
                        format: format.to_string(),
                        position,
                    }
                })?;

                if index >= argument_count {
                    return Err(ExpressionError::MissingArgument {
                        format: format.to_string(),
                        index,
                    });
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(core::mem::take(&mut literal)));
                }
                segments.push(Segment::Argument(index));
            }
            '}' => {
                return Err(ExpressionError::UnbalancedBrace {
                    format: format.to_string(),
                    position,
                });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
