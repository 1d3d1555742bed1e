//! Variable reference parser
//!
//! Finds variable references in template strings together with their
//! positions. Recognised forms:
//!
//! - `$name`
//! - `${name}` and `${name:format}`
//! - `[[name]]` and `[[name:format]]`

use std::ops::Range;

/// A variable reference found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name, without delimiters.
    pub name: String,

    /// Explicit format requested by the reference (`${name:regex}`).
    pub format: Option<String>,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a reference without an explicit format.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            format: None,
            span,
        }
    }

    /// Sets the explicit format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Parses a string and extracts all variable references, in order.
///
/// Malformed or unterminated references are skipped.
#[must_use]
pub fn parse_references(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        let found = if let Some(inner) = rest.strip_prefix("${") {
            inner
                .find('}')
                .and_then(|close| enclosed(&inner[..close], pos..pos + close + 3))
        } else if let Some(inner) = rest.strip_prefix("[[") {
            inner
                .find("]]")
                .and_then(|close| enclosed(&inner[..close], pos..pos + close + 4))
        } else if let Some(inner) = rest.strip_prefix('$') {
            let len = inner.find(|c: char| !is_name_char(c)).unwrap_or(inner.len());
            let name = &inner[..len];
            is_valid_variable_name(name).then(|| VariableReference::new(name, pos..pos + len + 1))
        } else {
            None
        };

        match found {
            Some(reference) => {
                pos = reference.span.end;
                references.push(reference);
            }
            None => pos += rest.chars().next().map_or(1, char::len_utf8),
        }
    }

    references
}

fn enclosed(content: &str, span: Range<usize>) -> Option<VariableReference> {
    let (name, format) = match content.split_once(':') {
        Some((name, format)) => (name.trim(), Some(format.trim())),
        None => (content.trim(), None),
    };
    if !is_valid_variable_name(name) {
        return None;
    }

    let reference = VariableReference::new(name, span);
    Some(match format {
        Some(format) if !format.is_empty() => reference.with_format(format),
        _ => reference,
    })
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Validates a variable name.
///
/// Valid names start with a letter or underscore and continue with
/// letters, digits or underscores.
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(is_name_char),
        _ => false,
    }
}

/// Returns true if the input contains at least one variable reference.
#[must_use]
pub fn has_references(input: &str) -> bool {
    !parse_references(input).is_empty()
}
