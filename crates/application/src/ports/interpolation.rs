//! Template interpolation port

use dashvar_domain::ScopedVars;

/// How interpolated values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationFormat {
    /// Values are inserted verbatim.
    #[default]
    Raw,
    /// Values are escaped so they match literally inside a regex.
    Regex,
}

/// Port for replacing variable references in template strings.
pub trait TemplateInterpolator: Send + Sync {
    /// Interpolates `text`.
    ///
    /// `scoped_vars` take precedence over the interpolator's own variables.
    /// References that cannot be resolved are left untouched.
    fn interpolate(
        &self,
        text: &str,
        scoped_vars: Option<&ScopedVars>,
        format: InterpolationFormat,
    ) -> String;
}
