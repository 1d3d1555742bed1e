//! Template interpolation service.

use std::collections::HashMap;

use dashvar_application::ports::{InterpolationFormat, TemplateInterpolator};
use dashvar_domain::{ScopedVar, ScopedVars};
use parking_lot::RwLock;

use super::parser::{VariableReference, parse_references};

/// Interpolates variable references from scoped and dashboard variables.
///
/// Scoped variables take precedence over dashboard variables. Unknown
/// references are left as written.
#[derive(Debug, Default)]
pub struct TemplateSrv {
    variables: RwLock<HashMap<String, ScopedVar>>,
}

impl TemplateSrv {
    /// Creates an interpolator without dashboard variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current value of a dashboard variable.
    pub fn set_variable(&self, name: impl Into<String>, current: ScopedVar) {
        self.variables.write().insert(name.into(), current);
    }

    /// Removes a dashboard variable.
    pub fn remove_variable(&self, name: &str) {
        self.variables.write().remove(name);
    }

    /// Returns the current value of a dashboard variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<ScopedVar> {
        self.variables.read().get(name).cloned()
    }

    fn render(
        reference: &VariableReference,
        current: &ScopedVar,
        format: InterpolationFormat,
    ) -> String {
        match reference.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("text") => current.text.clone(),
            Some("raw") => current.value.clone(),
            Some("regex") => regex::escape(&current.value),
            Some(other) => {
                tracing::trace!(variable = %reference.name, format = other, "unknown interpolation format");
                Self::render_value(&current.value, format)
            }
            None => Self::render_value(&current.value, format),
        }
    }

    fn render_value(value: &str, format: InterpolationFormat) -> String {
        match format {
            InterpolationFormat::Raw => value.to_string(),
            InterpolationFormat::Regex => regex::escape(value),
        }
    }
}

impl TemplateInterpolator for TemplateSrv {
    fn interpolate(
        &self,
        text: &str,
        scoped_vars: Option<&ScopedVars>,
        format: InterpolationFormat,
    ) -> String {
        let references = parse_references(text);
        if references.is_empty() {
            return text.to_string();
        }

        let variables = self.variables.read();
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for reference in &references {
            output.push_str(&text[last..reference.span.start]);

            let current = scoped_vars
                .and_then(|vars| vars.get(&reference.name))
                .or_else(|| variables.get(&reference.name));
            match current {
                Some(current) => output.push_str(&Self::render(reference, current, format)),
                None => output.push_str(&text[reference.span.clone()]),
            }
            last = reference.span.end;
        }

        output.push_str(&text[last..]);
        output
    }
}
