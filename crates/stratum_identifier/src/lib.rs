//! Identifier rules for generated infrastructure definitions.
//!
//! Resource names flow into generated infrastructure code as identifiers, and
//! that language accepts a narrow grammar:
//!
//! ```text
//! identifier := [A-Za-z_] [A-Za-z0-9_]*
//! ```
//!
//! Two operations are provided, and they are deliberately separate:
//!
//! - [`normalize`] rewrites arbitrary text into a legal identifier. Use it when
//!   the identifier is generated and the user never sees it verbatim.
//! - [`ensure_valid`] rejects anything that is not already a legal identifier.
//!   Use it when a user-declared name will appear verbatim on other surfaces,
//!   so a rewritten name would surprise them.
//!
//! # Character classes
//!
//! Only ASCII letters, ASCII digits and `_` are identifier characters. Unicode
//! letters that render or case-fold like ASCII letters (the Kelvin sign `K`,
//! U+212A, is the classic case) are *not* letters here: they are replaced by
//! `_` during normalization and rejected by validation, so a name can never
//! pass validation while looking like a different, legal name.
//!
//! # Example
//!
//! ```
//! use stratum_identifier::{ensure_valid, normalize};
//!
//! assert_eq!(normalize("my variable"), "my_variable");
//! assert_eq!(normalize("1my-variable"), "_1my_variable");
//!
//! assert!(ensure_valid("my_variable9").is_ok());
//! assert!(ensure_valid("my-variable").is_err());
//! ```

/// Error returned by [`ensure_valid`] for names outside the identifier grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid identifier '{input}': must start with an ASCII letter or '_' and contain only ASCII letters, digits, or '_'"
)]
pub struct InvalidIdentifierError {
    /// The rejected input, verbatim.
    pub input: String,
}

/// Replacement for every character outside the identifier alphabet.
const REPLACEMENT: char = '_';

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Rewrites `input` into a legal identifier.
///
/// - every character outside `[A-Za-z0-9_]` becomes `_` (one `_` per
///   character, including non-ASCII look-alikes of ASCII letters)
/// - if the first character cannot start an identifier, `_` is prepended
///
/// The function is total and idempotent. The empty string normalizes to `"_"`.
/// Output is never truncated.
#[must_use]
pub fn normalize(input: &str) -> String {
    let mut normalized = String::with_capacity(input.len() + 1);

    if !input.chars().next().is_some_and(is_identifier_start) {
        normalized.push(REPLACEMENT);
    }

    normalized.extend(input.chars().map(|c| {
        if is_identifier_continue(c) {
            c
        } else {
            REPLACEMENT
        }
    }));

    normalized
}

/// Returns `true` if `input` is already a legal identifier.
///
/// Equivalent to `normalize(input) == input`.
#[must_use]
pub fn is_valid(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_continue)
}

/// Fails unless `input` is already a legal identifier.
///
/// Never rewrites the name; see [`normalize`] for the rewriting counterpart.
///
/// # Errors
///
/// Returns [`InvalidIdentifierError`] if `input` is empty, starts with a
/// character other than an ASCII letter or `_`, or contains any character
/// outside `[A-Za-z0-9_]`.
pub fn ensure_valid(input: &str) -> Result<(), InvalidIdentifierError> {
    if is_valid(input) {
        Ok(())
    } else {
        Err(InvalidIdentifierError {
            input: input.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KELVIN: char = '\u{212A}';

    #[test]
    fn normalize_replaces_illegal_characters() {
        let cases = [
            ("my_variable", "my_variable"),
            ("my-variable", "my_variable"),
            ("my variable", "my_variable"),
            ("_my_variable", "_my_variable"),
            ("_my-variable", "_my_variable"),
            ("_my variable", "_my_variable"),
            ("my_variable9", "my_variable9"),
            ("my_variable@", "my_variable_"),
            ("my_variable-", "my_variable_"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize(input), expected, "normalize({input:?})");
        }
    }

    #[test]
    fn normalize_prefixes_leading_digit() {
        assert_eq!(normalize("1my_variable"), "_1my_variable");
        assert_eq!(normalize("1my-variable"), "_1my_variable");
        assert_eq!(normalize("1my variable"), "_1my_variable");
    }

    #[test]
    fn normalize_prefixes_leading_symbol_and_replaces_it() {
        assert_eq!(normalize("-name"), "__name");
    }

    #[test]
    fn normalize_empty_is_underscore() {
        assert_eq!(normalize(""), "_");
    }

    #[test]
    fn normalize_replaces_kelvin_sign() {
        let input = format!("my_{KELVIN}_variable-");
        assert_eq!(normalize(&input), "my___variable_");
    }

    #[test]
    fn normalize_replaces_each_multibyte_character_once() {
        assert_eq!(normalize("caf\u{e9}"), "caf_");
        assert_eq!(normalize("\u{FF21}bc"), "__bc");
    }

    #[test]
    fn ensure_valid_accepts_identifiers() {
        for input in ["my_variable9", "_my_variable", "_", "A", "a1_b2"] {
            assert!(ensure_valid(input).is_ok(), "{input:?} should be valid");
        }
    }

    #[test]
    fn ensure_valid_rejects_illegal_names() {
        let kelvin = format!("my_{KELVIN}_variable");
        let cases = [
            "my-variable",
            "my variable",
            "_my-variable",
            "_my variable",
            "1my_variable",
            "1my-variable",
            "1my variable",
            "my_variable@",
            "my_variable-",
            kelvin.as_str(),
            "",
        ];

        for input in cases {
            let err = ensure_valid(input).expect_err(input);
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn error_message_names_the_input() {
        let err = ensure_valid("bad-name").unwrap_err();
        assert!(err.to_string().contains("'bad-name'"));
    }
}
