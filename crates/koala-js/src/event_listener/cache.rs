//! Compile-once storage for a listener's function.

use boa_engine::object::builtins::JsFunction;

use super::ToStringInterceptor;

/// Holds a listener's compiled function.
///
/// Filled at most once. Dropping the cache forgets the function's
/// reconstructed source along with it.
#[derive(Debug, Default)]
pub struct FunctionCache {
    compiled: Option<CompiledHandler>,
}

#[derive(Debug)]
struct CompiledHandler {
    function: JsFunction,
}

impl Drop for CompiledHandler {
    fn drop(&mut self) {
        ToStringInterceptor::detach(&self.function);
    }
}

impl FunctionCache {
    /// An empty cache.
    pub const fn new() -> Self {
        Self { compiled: None }
    }

    /// The compiled function, if any.
    pub fn get(&self) -> Option<&JsFunction> {
        self.compiled.as_ref().map(|handler| &handler.function)
    }

    /// Whether nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.compiled.is_none()
    }

    /// The compiled function, running `compile` first if the cache is
    /// empty. A failed `compile` leaves the cache empty, so the next call
    /// tries again.
    ///
    /// # Errors
    ///
    /// Returns whatever `compile` returns.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        compile: impl FnOnce() -> Result<JsFunction, E>,
    ) -> Result<&JsFunction, E> {
        let handler = match self.compiled.take() {
            Some(handler) => handler,
            None => CompiledHandler { function: compile()? },
        };
        Ok(&self.compiled.insert(handler).function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_engine::{Context, Source};

    fn function(context: &mut Context, source: &str) -> JsFunction {
        let value = context.eval(Source::from_bytes(source)).unwrap();
        JsFunction::from_object(value.as_object().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_compiles_once() {
        let mut context = Context::default();
        let mut cache = FunctionCache::new();
        let mut calls = 0;

        let first = cache
            .get_or_try_insert_with(|| -> Result<_, ()> {
                calls += 1;
                Ok(function(&mut context, "(function () { return 1; })"))
            })
            .unwrap()
            .clone();
        let second = cache
            .get_or_try_insert_with(|| -> Result<_, ()> {
                calls += 1;
                Ok(function(&mut context, "(function () { return 2; })"))
            })
            .unwrap()
            .clone();

        assert_eq!(calls, 1);
        assert!(boa_engine::JsObject::equals(&first, &second));
    }

    #[test]
    fn test_failure_leaves_cache_empty() {
        let mut context = Context::default();
        let mut cache = FunctionCache::new();

        let failed = cache.get_or_try_insert_with(|| Err("no context"));
        assert_eq!(failed.err(), Some("no context"));
        assert!(cache.is_empty());

        let compiled = cache.get_or_try_insert_with(|| -> Result<_, &str> {
            Ok(function(&mut context, "(function () {})"))
        });
        assert!(compiled.is_ok());
        assert!(cache.get().is_some());
    }
}
