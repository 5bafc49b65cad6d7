use crate::entity::EntitySelector;
use cdc_core::{EntityOperation, ValueMap};

/// Setters shared by every selector builder.
///
/// Each builder owns the selector it is building; the provided methods only
/// touch the common [`EntitySelector`] part and leave the rest to the
/// implementing builder.
pub trait SelectorBuilder: Sized {
    type Output;

    fn entity(&mut self) -> &mut EntitySelector;

    fn build(self) -> Self::Output;

    fn with_operation(mut self, operation: EntityOperation) -> Self {
        self.entity().operation = Some(operation);
        self
    }

    /// Only match changes touching every one of `properties`.
    fn with_changes_to<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity().changes_to = properties.into_iter().map(Into::into).collect();
        self
    }

    fn with_executing_user(mut self, user: impl Into<String>) -> Self {
        self.entity().executing_user = Some(user.into());
        self
    }

    fn with_authenticated_user(mut self, user: impl Into<String>) -> Self {
        self.entity().authenticated_user = Some(user.into());
        self
    }

    fn with_tx_metadata(mut self, metadata: ValueMap) -> Self {
        self.entity().tx_metadata = metadata;
        self
    }

    fn including_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity().include_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    fn excluding_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity().exclude_properties = properties.into_iter().map(Into::into).collect();
        self
    }
}
