//! JavaScript global objects.
//!
//! This module registers built-in global objects like `console` that are
//! available to all JavaScript code, in every world.
//!
//! # Implemented
//!
//! - `console` - [Console Standard](https://console.spec.whatwg.org/)
//! - `event` - set by the event handler machinery while a handler runs
//!
//! # Not Yet Implemented
//!
//! - `document` - [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//! - `window` - [§ 7.2 The Window object](https://html.spec.whatwg.org/multipage/window-object.html)
//! - `setTimeout`/`setInterval` - [§ 8.6 Timers](https://html.spec.whatwg.org/multipage/timers-and-user-prompts.html#timers)

mod console;

use boa_engine::Context;

/// Register all global objects on the context's current realm.
///
/// [§ 8.1.6.1 Realms and their counterparts](https://html.spec.whatwg.org/multipage/webappapis.html#realms-settings-objects-global-objects)
///
/// "A global object is a JavaScript object that is the global object for
/// a JavaScript realm."
///
/// Called once per realm: for the main world when creating a `JsRuntime`,
/// and for each isolated world as it is created.
pub fn register_globals(context: &mut Context) {
    console::register_console(context);
}
