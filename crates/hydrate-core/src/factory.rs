use crate::{
    graph::Instance,
    schema::{PropertyDecl, TypeDescriptor},
    Error, Result, Value,
};

use std::fmt::Debug;

/// Object-construction collaborator.
///
/// The engine never constructs destination objects directly; it asks the
/// factory, handing it the capability table registered for the type.
pub trait ObjectFactory: Debug + Send + Sync + 'static {
    /// Default-constructs an instance of the described type.
    fn create(&self, descriptor: &TypeDescriptor) -> Result<Instance>;

    /// Constructs through the descriptor's `constructor`-th declared
    /// constructor with positional arguments.
    fn create_with_args(
        &self,
        descriptor: &TypeDescriptor,
        constructor: usize,
        args: Vec<Value>,
    ) -> Result<Instance>;

    /// Fresh, empty collection container.
    fn create_collection(&self) -> Value {
        Value::List(Vec::new())
    }

    fn is_collection(&self, decl: &PropertyDecl) -> bool {
        decl.collection
    }
}

/// Descriptor-driven factory shipped with the crate.
#[derive(Debug, Default)]
pub struct DefaultFactory;

impl ObjectFactory for DefaultFactory {
    fn create(&self, descriptor: &TypeDescriptor) -> Result<Instance> {
        Ok(Instance::new(descriptor.id.clone()))
    }

    fn create_with_args(
        &self,
        descriptor: &TypeDescriptor,
        constructor: usize,
        args: Vec<Value>,
    ) -> Result<Instance> {
        let Some(decl) = descriptor.constructors.get(constructor) else {
            return Err(Error::invalid_mapping(format!(
                "descriptor `{}` has no constructor #{constructor}",
                descriptor.id
            )));
        };
        if decl.params.len() != args.len() {
            return Err(Error::invalid_mapping(format!(
                "descriptor `{}` constructor #{constructor} takes {} arguments, got {}",
                descriptor.id,
                decl.params.len(),
                args.len()
            )));
        }
        let mut instance = Instance::new(descriptor.id.clone());
        for (param, arg) in decl.params.iter().zip(args) {
            instance.set_property(param.name.clone(), arg);
        }
        Ok(instance)
    }
}
