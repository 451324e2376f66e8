mod init;
mod store;

pub use init::{ConstParamGen, ParamGen, RandParamGen};
pub use store::{ParamId, ParamStore, shape_size};

/// A parameter as exposed by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameter<'a, H> {
    pub name: &'a str,
    pub handle: H,
    pub requires_grad: bool,
}

/// A model that can enumerate its parameters by name.
pub trait NamedParameters {
    /// The handle used to refer to one of the model's parameters.
    type Handle: Clone;

    /// Returns the model's parameters in definition order, input-facing first.
    fn named_parameters(&self) -> impl Iterator<Item = NamedParameter<'_, Self::Handle>>;
}
