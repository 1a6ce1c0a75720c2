//! Integration tests for identifier resolution inside inline event handlers:
//! the element first, then its form owner, then its document.

use boa_engine::property::PropertyKey;
use boa_engine::{JsObject, JsValue, js_string};
use koala_dom::{DomTree, ElementData, NodeId};
use koala_js::{ExecutionContext, LazyEventListener, ScopeChain, SourceRecord, WorldId};

/// ```text
/// document > html > body > form#login[name=login] > input[name=user][value=alice]
///                                                 > input#pwd[name=pwd][value=secret]
///                        > form[name=user]
///                        > button[name=lonely]
/// ```
struct Page {
    tree: DomTree,
    login: NodeId,
    user: NodeId,
    pwd: NodeId,
    lonely: NodeId,
}

fn page() -> Page {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("body"));
    let login = tree.append_element(
        body,
        ElementData::new("form")
            .with_attribute("id", "login")
            .with_attribute("name", "login"),
    );
    let user = tree.append_element(
        login,
        ElementData::new("input")
            .with_attribute("name", "user")
            .with_attribute("value", "alice"),
    );
    let pwd = tree.append_element(
        login,
        ElementData::new("input")
            .with_attribute("id", "pwd")
            .with_attribute("name", "pwd")
            .with_attribute("value", "secret"),
    );
    let _ = tree.append_element(body, ElementData::new("form").with_attribute("name", "user"));
    let lonely = tree.append_element(body, ElementData::new("button").with_attribute("name", "lonely"));
    Page {
        tree,
        login,
        user,
        pwd,
        lonely,
    }
}

/// Compile `code` as an `onclick` handler and run it on `node`.
fn run(page: Page, node: NodeId, code: &str) -> JsValue {
    let mut context = ExecutionContext::new("https://example.com/", page.tree);
    let mut listener = LazyEventListener::new(SourceRecord::new("onclick", code), WorldId::MAIN);
    listener
        .invoke(&mut context, &JsValue::undefined(), node)
        .unwrap()
        .unwrap()
}

fn text(value: &JsValue) -> String {
    value.as_string().map(|s| s.to_std_string_escaped()).unwrap()
}

#[test]
fn test_element_properties_are_in_scope() {
    let page = page();
    let pwd = page.pwd;
    assert_eq!(text(&run(page, pwd, "return name + '=' + value;")), "pwd=secret");
}

#[test]
fn test_element_shadows_form() {
    // Both the input and its form have `name`.
    let page = page();
    let pwd = page.pwd;
    assert_eq!(text(&run(page, pwd, "return name;")), "pwd");
}

#[test]
fn test_form_controls_are_in_scope() {
    let page = page();
    let pwd = page.pwd;
    assert_eq!(text(&run(page, pwd, "return user.value;")), "alice");
}

#[test]
fn test_form_shadows_document() {
    // The form has a control named `user`; the document has a form named
    // `user`. The control wins.
    let page = page();
    let pwd = page.pwd;
    assert_eq!(text(&run(page, pwd, "return user.tagName;")), "INPUT");
}

#[test]
fn test_document_is_last() {
    // `login` is not a property of the input or its form, only of the
    // document.
    let page = page();
    let user = page.user;
    assert_eq!(text(&run(page, user, "return login.id;")), "login");
}

#[test]
fn test_element_without_form_falls_back_to_document() {
    let page = page();
    let lonely = page.lonely;
    assert_eq!(
        text(&run(page, lonely, "return String(form) + ' ' + user.tagName;")),
        "null FORM"
    );
}

#[test]
fn test_globals_are_still_reachable() {
    let page = page();
    let user = page.user;
    assert_eq!(text(&run(page, user, "return typeof Math.max + ' ' + typeof console;")), "function object");
}

#[test]
fn test_bare_call_binds_owning_element() {
    let page = page();
    let user = page.user;
    assert_eq!(
        text(&run(page, user, "this.self = function () { return this; }; return String(self() === this);")),
        "true"
    );
}

#[test]
fn test_bare_call_binds_owning_form() {
    // A form method called bare from a control runs against the form, as
    // `submit()` and `reset()` do in pages.
    let page = page();
    let pwd = page.pwd;
    assert_eq!(
        text(&run(page, pwd, "this.form.whoami = function () { return this.id; }; return whoami();")),
        "login"
    );
}

#[test]
fn test_wrapper_names_are_hidden() {
    let page = page();
    let user = page.user;
    assert_eq!(
        text(&run(page, user, "return typeof __koalaHandlerScope + ' ' + typeof __koalaScopes;")),
        "undefined undefined"
    );
}

#[test]
fn test_unresolved_names_throw() {
    let page = page();
    let user = page.user;
    let mut context = ExecutionContext::new("https://example.com/", page.tree);
    let mut listener =
        LazyEventListener::new(SourceRecord::new("onclick", "return nowhere;"), WorldId::MAIN);

    let err = listener
        .invoke(&mut context, &JsValue::undefined(), user)
        .unwrap_err();
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_assignment_lands_on_resolved_object() {
    let page = page();
    let (user, login) = (page.user, page.login);
    let mut context = ExecutionContext::new("https://example.com/", page.tree);
    let mut listener = LazyEventListener::new(
        SourceRecord::new("onclick", "value = 'bob'; fresh = 1; return typeof this.fresh + ' ' + fresh;"),
        WorldId::MAIN,
    );

    let result = listener
        .invoke(&mut context, &JsValue::undefined(), user)
        .unwrap()
        .unwrap();
    // Unresolved names are not captured by the scope; they become globals.
    assert_eq!(text(&result), "undefined 1");

    let (tree, runtime) = context.scripting().unwrap();
    let input = runtime.node_object(tree, WorldId::MAIN, user).unwrap().unwrap();
    let form = runtime.node_object(tree, WorldId::MAIN, login).unwrap().unwrap();
    let engine = runtime.context_mut();
    assert_eq!(
        text(&input.get(js_string!("value"), engine).unwrap()),
        "bob"
    );
    assert!(!form.has_own_property(js_string!("fresh"), engine).unwrap());
}

#[test]
fn test_node_object_identity() {
    let page = page();
    let (user, login) = (page.user, page.login);
    let mut context = ExecutionContext::new("https://example.com/", page.tree);
    let (tree, runtime) = context.scripting().unwrap();

    let input = runtime.node_object(tree, WorldId::MAIN, user).unwrap().unwrap();
    let form = runtime.node_object(tree, WorldId::MAIN, login).unwrap().unwrap();
    let again = runtime.node_object(tree, WorldId::MAIN, user).unwrap().unwrap();
    let engine = runtime.context_mut();
    let owner = input.get(js_string!("form"), engine).unwrap();

    assert!(JsObject::equals(&input, &again));
    assert!(JsObject::equals(owner.as_object().unwrap(), &form));
}

#[test]
fn test_scope_chain_for_receiver() {
    let page = page();
    let (user, login, lonely) = (page.user, page.login, page.lonely);
    let mut context = ExecutionContext::new("https://example.com/", page.tree);
    let (tree, runtime) = context.scripting().unwrap();

    let input = runtime.node_object(tree, WorldId::MAIN, user).unwrap().unwrap();
    let form = runtime.node_object(tree, WorldId::MAIN, login).unwrap().unwrap();
    let document = runtime.node_object(tree, WorldId::MAIN, NodeId::ROOT).unwrap().unwrap();
    let button = runtime.node_object(tree, WorldId::MAIN, lonely).unwrap().unwrap();
    let engine = runtime.context_mut();

    let chain = ScopeChain::for_receiver(&input, engine).unwrap();
    assert_eq!(chain.links().len(), 3);
    assert!(JsObject::equals(&chain.links()[0], &input));
    assert!(JsObject::equals(&chain.links()[1], &form));
    assert!(JsObject::equals(&chain.links()[2], &document));

    let chain = ScopeChain::for_receiver(&button, engine).unwrap();
    assert_eq!(chain.links().len(), 2);
    assert!(JsObject::equals(&chain.links()[1], &document));

    let chain = ScopeChain::for_receiver(&document, engine).unwrap();
    assert_eq!(chain.links().len(), 1);

    let key: PropertyKey = js_string!("user").into();
    let resolved = chain.resolve(&key, engine).unwrap().unwrap();
    assert!(JsObject::equals(resolved, &document));
}
