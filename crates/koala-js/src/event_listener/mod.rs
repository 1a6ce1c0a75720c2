//! Inline event handler compilation.
//!
//! [§ 8.1.8 Events](https://html.spec.whatwg.org/multipage/webappapis.html#events)
//!
//! - [`SourceRecord`]: the handler as authored (name, body, origin)
//! - [`scope`]: the compiled wrapper and the element/form/document lookup
//!   chain it runs under
//! - [`FunctionCache`]: compile-once storage
//! - [`ToStringInterceptor`]: makes `toString()` report the authored source
//! - [`LazyEventListener`]: compiles on first dispatch and invokes

mod cache;
mod lazy;
pub mod scope;
mod source;
mod to_string;

pub use cache::FunctionCache;
pub use lazy::LazyEventListener;
pub use scope::ScopeChain;
pub use source::{SourceRecord, TextPosition};
pub use to_string::ToStringInterceptor;
