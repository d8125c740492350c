use futures::future::{self, BoxFuture};
use rioc::{RemoteTuple, Value, WireError};
use rioc_rpc_service::MethodDescriptor;
use std::future::Future;
use std::sync::Arc;

/// A type-erased method: decoded argument values in, return values out.
pub type MethodHandler =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Vec<Value>, WireError>> + Send + Sync>;

/// A method a component registered, with its declared shape.
#[derive(Clone)]
pub struct RegisteredMethod {
    pub descriptor: MethodDescriptor,
    pub handler: MethodHandler,
}

/// Collects a component's methods during registration.
///
/// Duplicate names and malformed descriptors are recorded rather than
/// rejected on the spot, so the endpoint can report every problem at once.
#[derive(Default)]
pub struct MethodTable {
    methods: Vec<RegisteredMethod>,
    problems: Vec<String>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method taking the parameter tuple `P` and returning the
    /// return tuple `R`.
    pub fn method<P, R, F, Fut>(&mut self, name: &str, handler: F) -> &mut Self
    where
        P: RemoteTuple + Send + 'static,
        R: RemoteTuple + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.insert(MethodDescriptor::of::<P, R>(name), handler)
    }

    /// Registers a method whose last parameter is variadic. That parameter
    /// must be a `Vec`.
    pub fn variadic_method<P, R, F, Fut>(&mut self, name: &str, handler: F) -> &mut Self
    where
        P: RemoteTuple + Send + 'static,
        R: RemoteTuple + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.insert(MethodDescriptor::variadic::<P, R>(name), handler)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredMethod> {
        self.methods
            .iter()
            .find(|method| method.descriptor.name == name)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.methods
            .iter()
            .map(|method| method.descriptor.name.clone())
            .collect()
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub(crate) fn into_parts(self) -> (Vec<RegisteredMethod>, Vec<String>) {
        (self.methods, self.problems)
    }

    fn insert<P, R, F, Fut>(&mut self, descriptor: MethodDescriptor, handler: F) -> &mut Self
    where
        P: RemoteTuple + Send + 'static,
        R: RemoteTuple + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        if self.get(&descriptor.name).is_some() {
            self.problems
                .push(format!("method `{}` is registered twice", descriptor.name));
            return self;
        }
        if let Some(problem) = descriptor.problem() {
            self.problems.push(problem);
            return self;
        }

        let handler: MethodHandler = Arc::new(
            move |values: Vec<Value>| -> BoxFuture<'static, Result<Vec<Value>, WireError>> {
                match P::from_values(values) {
                    Ok(params) => {
                        let pending = handler(params);
                        Box::pin(async move { Ok(pending.await.into_values()) })
                    }
                    Err(err) => Box::pin(future::ready(Err(err))),
                }
            },
        );

        self.methods.push(RegisteredMethod {
            descriptor,
            handler,
        });
        self
    }
}
