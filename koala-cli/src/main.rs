//! Koala handler CLI
//!
//! Registers an inline event handler on a small fixture document, prints
//! the source its `toString()` reports, and fires an event at it.
//!
//! The fixture is:
//!
//! ```text
//! <html><body>
//!   <form id="login" name="login">
//!     <input name="user" value="alice" on<event>="...">
//!     <svg><rect id="shape" on<event>="..."></svg>   (with --svg)
//!   </form>
//! </body></html>
//! ```
//!
//! Set `RUST_LOG=koala_js=debug` to watch compilation.

use anyhow::{Context as _, Result};
use clap::Parser;
use koala_dom::{DomTree, ElementData, NodeId};
use koala_js::{EventHandlerMap, ExecutionContext, TextPosition, ToStringInterceptor, WorldId};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// Koala: compile and fire an inline event handler
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Free identifiers resolve against the input, its form, then the document
    koala --code "return value + ' / ' + user.value + ' / ' + login.name;"

    # SVG handlers name their parameter evt
    koala --svg --code "return evt.type;"

    # Compile errors are reported against the document line
    koala --line 12 --url page.html --code "return (;"
"#)]
struct Cli {
    /// Handler body, as written in the attribute
    #[arg(long, value_name = "JS")]
    code: String,

    /// Event type to fire; the handler is registered as on<event>
    #[arg(long, default_value = "click")]
    event: String,

    /// Put the handler on an SVG element instead of the input
    #[arg(long)]
    svg: bool,

    /// Run the handler in a fresh isolated world
    #[arg(long)]
    isolated: bool,

    /// Document URL used in diagnostics
    #[arg(long, default_value = "about:blank")]
    url: String,

    /// Document line the handler text starts on
    #[arg(long, default_value = "1")]
    line: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run(&cli)
}

fn init_tracing() {
    // Ignore the error if a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .try_init();
}

/// Register, print and fire the handler described by `cli`.
fn run(cli: &Cli) -> Result<()> {
    let event_type = cli.event.to_ascii_lowercase();
    let attribute = format!("on{event_type}");
    let (tree, target) = build_fixture(&attribute, &cli.code, cli.svg);
    let mut context = ExecutionContext::new(cli.url.clone(), tree);

    let world = if cli.isolated {
        context
            .runtime_mut()
            .context("scripting is disabled")?
            .create_isolated_world()
            .map_err(|e| anyhow::anyhow!("failed to create isolated world: {e}"))?
    } else {
        WorldId::MAIN
    };

    let mut handlers = EventHandlerMap::new();
    let registered = handlers.set_attribute_handler(
        context.dom(),
        target,
        &attribute,
        world,
        &cli.url,
        TextPosition::new(cli.line, 1),
    );
    if !registered {
        tracing::error!(%attribute, "not an event handler attribute");
        anyhow::bail!("`{attribute}` is not an event handler attribute");
    }

    println!("{}", format!("=== {attribute} ({world}) ===").bold());
    let listener = handlers
        .listener_mut(target, &event_type)
        .context("handler was not registered")?;
    let function = listener.try_compile(&mut context).inspect_err(|err| {
        tracing::error!(url = %cli.url, line = cli.line, "handler failed to compile: {err}");
    })?;
    if let Some(source) = ToStringInterceptor::reconstructed_source(function) {
        println!("{}", source.to_std_string_escaped());
    }

    println!("\n{}", "=== Result ===".bold());
    match handlers.dispatch(&mut context, target, &event_type) {
        Ok(Some(value)) => println!("{}", value.display().green()),
        Ok(None) => println!("{}", "handler did not run".dimmed()),
        Err(err) => {
            tracing::error!(event = %event_type, %world, "handler threw: {err}");
            anyhow::bail!("uncaught exception: {err}");
        }
    }
    Ok(())
}

/// Build the fixture document with the handler in `attribute`.
fn build_fixture(attribute: &str, code: &str, svg: bool) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("body"));
    let form = tree.append_element(
        body,
        ElementData::new("form")
            .with_attribute("id", "login")
            .with_attribute("name", "login"),
    );

    let mut input = ElementData::new("input")
        .with_attribute("name", "user")
        .with_attribute("value", "alice");
    if !svg {
        input = input.with_attribute(attribute, code);
    }
    let input = tree.append_element(form, input);
    if !svg {
        return (tree, input);
    }

    let canvas = tree.append_element(form, ElementData::svg("svg"));
    let shape = tree.append_element(
        canvas,
        ElementData::svg("rect")
            .with_attribute("id", "shape")
            .with_attribute(attribute, code),
    );
    (tree, shape)
}
