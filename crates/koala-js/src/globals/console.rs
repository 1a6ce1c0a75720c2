//! Console API implementation.
//!
//! [Console Standard](https://console.spec.whatwg.org/)
//!
//! This module implements the `console` global object with `log`, `warn`,
//! and `error` methods. Output goes to `tracing` under the `js` target, so
//! page logging is filtered together with the engine's own.

use boa_engine::{
    Context, JsResult, JsValue, NativeFunction, js_string, object::ObjectInitializer,
    property::Attribute,
};

/// Register the console global object on the context.
///
/// [§ 1.1 Logging](https://console.spec.whatwg.org/#logging)
///
/// Creates a `console` object with the following methods:
/// - `console.log(...args)` - `info` level
/// - `console.warn(...args)` - `warn` level
/// - `console.error(...args)` - `error` level
///
/// # Not Yet Implemented
///
/// [§ 1.2 Counting](https://console.spec.whatwg.org/#counting),
/// [§ 1.3 Grouping](https://console.spec.whatwg.org/#grouping),
/// [§ 1.4 Timing](https://console.spec.whatwg.org/#timing).
pub fn register_console(context: &mut Context) {
    let console = ObjectInitializer::new(context)
        .function(NativeFunction::from_copy_closure(console_log), js_string!("log"), 0)
        .function(NativeFunction::from_copy_closure(console_warn), js_string!("warn"), 0)
        .function(NativeFunction::from_copy_closure(console_error), js_string!("error"), 0)
        .build();

    if let Err(err) = context.register_global_property(js_string!("console"), console, Attribute::all()) {
        tracing::error!(error = %err, "failed to register console");
    }
}

/// `console.log(...args)`
///
/// [§ 1.1.1 log](https://console.spec.whatwg.org/#log)
///
/// "Perform Logger("log", data)."
fn console_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let output = format_console_args(args, context)?;
    tracing::info!(target: "js", "{output}");
    Ok(JsValue::undefined())
}

/// `console.warn(...args)`
///
/// [§ 1.1.3 warn](https://console.spec.whatwg.org/#warn)
fn console_warn(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let output = format_console_args(args, context)?;
    tracing::warn!(target: "js", "{output}");
    Ok(JsValue::undefined())
}

/// `console.error(...args)`
///
/// [§ 1.1.2 error](https://console.spec.whatwg.org/#error)
fn console_error(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let output = format_console_args(args, context)?;
    tracing::error!(target: "js", "{output}");
    Ok(JsValue::undefined())
}

/// Format console arguments for output.
///
/// [§ 2.1 Formatter](https://console.spec.whatwg.org/#formatter)
///
/// Converts each argument to a string and joins them with spaces.
fn format_console_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let strings: Result<Vec<String>, _> = args
        .iter()
        .map(|arg| arg.to_string(context).map(|s| s.to_std_string_escaped()))
        .collect();

    Ok(strings?.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_engine::Source;

    #[test]
    fn test_format_console_args() {
        let mut context = Context::default();
        let args = [js_string!("a").into(), JsValue::from(1), JsValue::from(true)];
        assert_eq!(format_console_args(&args, &mut context).unwrap(), "a 1 true");
    }

    #[test]
    fn test_console_is_registered() {
        let mut context = Context::default();
        register_console(&mut context);
        let result = context
            .eval(Source::from_bytes("typeof console.log"))
            .unwrap();
        assert_eq!(result.to_string(&mut context).unwrap().to_std_string_escaped(), "function");
    }
}
