//! `toString()` for compiled handlers.
//!
//! The function the engine compiles for a handler is a wrapper around the
//! authored body. Pages call `toString()` on handlers and `eval` or
//! pattern-match the result, so the wrapper must report the authored source
//! instead:
//!
//! ```text
//! function onclick(event) {
//!   return 1;
//! }
//! ```
//!
//! Every compiled handler gets a `toString` built from one shared native
//! function. The reconstructed text lives in a side table keyed by the
//! handler's identity rather than on the function object, so page script
//! cannot see or enumerate it.

use std::cell::RefCell;
use std::sync::OnceLock;

use boa_engine::native_function::NativeFunctionPointer;
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::object::builtins::JsFunction;
use boa_engine::property::PropertyDescriptor;
use boa_engine::{Context, JsObject, JsResult, JsString, JsValue, NativeFunction, js_string};

use super::SourceRecord;

static INTERCEPTOR: OnceLock<ToStringInterceptor> = OnceLock::new();

thread_local! {
    /// Reconstructed source per compiled handler. Boa objects are bound to
    /// the thread that created them, so the table is per thread too.
    static RECONSTRUCTED: RefCell<Vec<(JsObject, JsString)>> = const { RefCell::new(Vec::new()) };
}

/// Factory for the `toString` replacement shared by all compiled handlers.
#[derive(Debug)]
pub struct ToStringInterceptor {
    to_string: NativeFunctionPointer,
}

impl ToStringInterceptor {
    /// The process-wide interceptor, created on first use.
    pub fn shared() -> &'static Self {
        INTERCEPTOR.get_or_init(|| {
            tracing::trace!("creating handler toString interceptor");
            Self {
                to_string: reconstructed_to_string,
            }
        })
    }

    /// Make `function` report `source`'s authored text from `toString()`
    /// and `source`'s function name from `name`.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if `function` rejects the property definitions.
    /// Nothing is recorded for `function` in that case.
    pub fn attach(&self, function: &JsFunction, source: &SourceRecord, context: &mut Context) -> JsResult<()> {
        let to_string = FunctionObjectBuilder::new(context.realm(), NativeFunction::from_fn_ptr(self.to_string))
            .name(js_string!("toString"))
            .length(0)
            .constructor(false)
            .build();
        let _ = function.define_property_or_throw(
            js_string!("toString"),
            PropertyDescriptor::builder()
                .value(to_string)
                .writable(true)
                .enumerable(false)
                .configurable(true)
                .build(),
            context,
        )?;

        let _ = function.define_property_or_throw(
            js_string!("name"),
            PropertyDescriptor::builder()
                .value(JsString::from(source.function_name()))
                .writable(false)
                .enumerable(false)
                .configurable(true)
                .build(),
            context,
        )?;

        remember(function, JsString::from(source.reconstructed_source()));
        Ok(())
    }

    /// The text `toString()` reports for `function`, if it is a compiled
    /// handler.
    pub fn reconstructed_source(function: &JsObject) -> Option<JsString> {
        RECONSTRUCTED.with_borrow(|table| {
            table
                .iter()
                .find(|(candidate, _)| JsObject::equals(candidate, function))
                .map(|(_, source)| source.clone())
        })
    }

    /// Forget `function`'s reconstructed source. Called when its listener
    /// is destroyed.
    pub fn detach(function: &JsObject) {
        RECONSTRUCTED.with_borrow_mut(|table| {
            table.retain(|(candidate, _)| !JsObject::equals(candidate, function));
        });
    }
}

fn remember(function: &JsObject, source: JsString) {
    RECONSTRUCTED.with_borrow_mut(|table| {
        match table
            .iter_mut()
            .find(|(candidate, _)| JsObject::equals(candidate, function))
        {
            Some(entry) => entry.1 = source,
            None => table.push((function.clone(), source)),
        }
    });
}

/// The shared `toString`: returns the reconstructed source of `this`, or
/// `undefined` when `this` is not a compiled handler.
fn reconstructed_to_string(this: &JsValue, _args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    Ok(this
        .as_object()
        .and_then(ToStringInterceptor::reconstructed_source)
        .map_or_else(JsValue::undefined, JsValue::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_is_created_once() {
        assert!(std::ptr::eq(ToStringInterceptor::shared(), ToStringInterceptor::shared()));
    }

    #[test]
    fn test_side_table_round_trip() {
        let mut context = Context::default();
        let object = JsObject::with_object_proto(context.intrinsics());
        let other = JsObject::with_object_proto(context.intrinsics());

        remember(&object, js_string!("function f(event) {\n  x\n}"));
        assert_eq!(
            ToStringInterceptor::reconstructed_source(&object).map(|s| s.to_std_string_escaped()),
            Some("function f(event) {\n  x\n}".to_string())
        );
        assert!(ToStringInterceptor::reconstructed_source(&other).is_none());

        let result = reconstructed_to_string(&other.clone().into(), &[], &mut context).unwrap();
        assert!(result.is_undefined());

        ToStringInterceptor::detach(&object);
        assert!(ToStringInterceptor::reconstructed_source(&object).is_none());
    }

    fn compile_function(code: &str, context: &mut Context) -> JsFunction {
        let value = context.eval(boa_engine::Source::from_bytes(code)).unwrap();
        value.as_object().cloned().and_then(JsFunction::from_object).unwrap()
    }

    #[test]
    fn test_attach_records_source() {
        let mut context = Context::default();
        let function = compile_function("(function () {})", &mut context);
        let source = SourceRecord::new("onclick", "return 1;");

        ToStringInterceptor::shared().attach(&function, &source, &mut context).unwrap();
        assert_eq!(
            ToStringInterceptor::reconstructed_source(&function).map(|s| s.to_std_string_escaped()),
            Some(source.reconstructed_source())
        );
        ToStringInterceptor::detach(&function);
    }

    #[test]
    fn test_failed_attach_records_nothing() {
        let mut context = Context::default();
        let function = compile_function("Object.freeze(function () {})", &mut context);
        let source = SourceRecord::new("onclick", "return 1;");

        assert!(ToStringInterceptor::shared().attach(&function, &source, &mut context).is_err());
        assert!(ToStringInterceptor::reconstructed_source(&function).is_none());
    }
}
