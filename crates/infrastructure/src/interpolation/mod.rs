//! Template interpolation.

mod parser;
mod template_srv;

pub use parser::{VariableReference, has_references, is_valid_variable_name, parse_references};
pub use template_srv::TemplateSrv;
