//! Error types for expression composition and resolution.

/// Errors raised while composing or rendering an expression.
///
/// These never involve I/O and surface at graph-construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// A reference has no symbolic form, or has neither capability at all.
    #[error("reference {index} ('{reference}') has no manifest representation")]
    NotManifestRepresentable {
        /// Position of the reference among the expression's arguments.
        index: usize,
        /// Description of the offending reference.
        reference: String,
    },

    /// A `{` or `}` in a format string is not part of a placeholder or escape.
    #[error("unbalanced brace at byte {position} in format '{format}'")]
    UnbalancedBrace {
        /// The format string.
        format: String,
        /// Byte offset of the brace.
        position: usize,
    },

    /// A placeholder body is not an argument index.
    #[error("invalid placeholder at byte {position} in format '{format}'")]
    InvalidPlaceholder {
        /// The format string.
        format: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A placeholder refers past the end of the argument list.
    #[error("placeholder {{{index}}} in format '{format}' has no matching argument")]
    MissingArgument {
        /// The format string.
        format: String,
        /// The out-of-range argument index.
        index: usize,
    },

    /// An argument is never referenced by the format string.
    #[error("argument {index} is not referenced by the format string")]
    UnusedArgument {
        /// The unreferenced argument index.
        index: usize,
    },
}

/// Errors raised while resolving a reference to its runtime value.
///
/// None of these are retried inside this crate; retry policy belongs to the
/// caller orchestrating deployment.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The resource owning the output is no longer part of the graph.
    #[error(
        "resource '{resource}' no longer exists (requested output '{output}'){}",
        vault_note(.vault.as_deref())
    )]
    OwnerMissing {
        /// Id of the missing resource.
        resource: String,
        /// Name of the requested output.
        output: String,
        /// Key vault whose endpoint was being resolved, if any.
        vault: Option<String>,
    },

    /// The resource is not deployed yet, or the deployed resource lacks the output.
    #[error(
        "output '{output}' of resource '{resource}' is not available{}",
        vault_note(.vault.as_deref())
    )]
    OutputNotAvailable {
        /// Id of the resource.
        resource: String,
        /// Name of the requested output.
        output: String,
        /// Key vault whose endpoint was being resolved, if any.
        vault: Option<String>,
    },

    /// A key vault's endpoint resolved to an empty value.
    #[error("the vault endpoint for key vault '{vault}' is empty")]
    EmptyVaultEndpoint {
        /// Id of the key vault resource.
        vault: String,
    },

    /// The secret store has no secret with the requested name.
    #[error("secret '{secret}' was not found in key vault '{vault}'")]
    SecretNotFound {
        /// Id of the key vault resource.
        vault: String,
        /// Name of the secret.
        secret: String,
    },

    /// Credential or authorization failure reported by the secret store.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The reference has a symbolic form only.
    #[error("reference '{reference}' cannot be resolved to a value")]
    NotResolvable {
        /// Description of the reference.
        reference: String,
    },

    /// Any other failure reported by an external collaborator.
    #[error("collaborator error: {message}")]
    Collaborator {
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The resolution was cancelled by its caller.
    #[error("resolution was cancelled")]
    Cancelled,
}

fn vault_note(vault: Option<&str>) -> String {
    vault
        .map(|vault| format!(" while resolving the endpoint of key vault '{vault}'"))
        .unwrap_or_default()
}

impl ResolutionError {
    /// Returns `true` for cooperative cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolutionError::Cancelled)
    }

    /// Records the key vault whose endpoint lookup produced this error.
    ///
    /// Only [`OwnerMissing`](Self::OwnerMissing) and
    /// [`OutputNotAvailable`](Self::OutputNotAvailable) carry the annotation;
    /// every other error, and the variant itself, is returned unchanged.
    #[must_use]
    pub fn in_vault(mut self, vault_id: &str) -> Self {
        match &mut self {
            ResolutionError::OwnerMissing { vault, .. }
            | ResolutionError::OutputNotAvailable { vault, .. } => {
                *vault = Some(vault_id.to_string());
            }
            _ => {}
        }
        self
    }
}
