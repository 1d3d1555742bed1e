//! The variable family.

use async_trait::async_trait;
use dashvar_domain::VariableValueOption;

use crate::error::VariableResult;
use crate::query_variable::{QueryVariable, VariableGetOptionsArgs};

/// A variable whose options can be resolved on demand.
#[async_trait]
pub trait VariableValueProvider: Send + Sync {
    /// Name the variable is referenced by.
    fn name(&self) -> String;

    /// Resolves the variable's options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be resolved.
    async fn get_value_options(
        &self,
        args: &VariableGetOptionsArgs,
    ) -> VariableResult<Vec<VariableValueOption>>;
}

#[async_trait]
impl VariableValueProvider for QueryVariable {
    fn name(&self) -> String {
        Self::name(self)
    }

    async fn get_value_options(
        &self,
        args: &VariableGetOptionsArgs,
    ) -> VariableResult<Vec<VariableValueOption>> {
        Self::get_value_options(self, args).await
    }
}
