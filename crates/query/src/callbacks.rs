// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in callbacks: the mutations a matched definition or call site can be rewritten into,
//! expressed in terms of [`codeshift_imr`] rather than hand-built CST surgery (ยง4.5).

use codeshift_cst::pattern::Captures;
use codeshift_cst::{NodeId, NonterminalKind, TokenKind, Tree};
use codeshift_imr::{explode, replace, Argument, ListKind, Star};

use crate::filters::list_and_kind;
use crate::{ParamSpec, ParameterList, QueryError, Star as ParamStar};

fn captured_name(captures: &Captures) -> Option<NodeId> {
    captures.get("name").and_then(codeshift_cst::pattern::Matched::as_single)
}

/// Renames the matched definition or call site's `name` capture to `new_name`, in place (the
/// leaf's value changes; nothing is replaced or re-matched).
pub fn rename(tree: &mut Tree, node: NodeId, captures: &Captures, new_name: &str) -> Result<Option<NodeId>, QueryError> {
    let name_leaf = captured_name(captures).unwrap_or(node);
    tree.set_value(name_leaf, new_name.to_string());
    Ok(None)
}

/// Adds an argument to a call site's arglist (or a definition's typedargslist). `positional`
/// controls whether it's appended as a bare positional value or as `name=value`/`name` (keyword
/// call argument or named parameter, respectively); for a definition entry the name is always
/// used regardless of `positional`, since a parameter always has a name.
///
/// Placement follows the documented ordering rather than a bare append: a definition entry goes
/// before the first default-valued or variadic parameter; a positional call argument goes before
/// the first keyword or starred argument (or at the position `parameters` describes, if given); a
/// keyword call argument goes before an existing `**kwargs`, otherwise at the end.
pub fn add_argument(
    tree: &mut Tree,
    node: NodeId,
    _captures: &Captures,
    parameters: Option<&ParameterList>,
    name: &str,
    value: &str,
    positional: bool,
) -> Result<Option<NodeId>, QueryError> {
    let Some((list, kind)) = list_and_kind(tree, node) else {
        return splice_first_argument(tree, node, name, value, positional);
    };
    let mut args = explode(tree, list)?;
    let at = insertion_index(kind, &args, name, positional, parameters);
    args.insert(at, new_argument(kind, name, value, positional));
    let fresh = replace(tree, list, kind, &args)?;
    Ok(Some(fresh))
}

/// Where a new entry belongs among `args`, per the placement rules `add_argument` documents.
fn insertion_index(kind: ListKind, args: &[Argument], name: &str, positional: bool, parameters: Option<&ParameterList>) -> usize {
    match kind {
        ListKind::Def => args.iter().position(|a| a.star != Star::None || !a.value.is_empty()).unwrap_or(args.len()),
        ListKind::Call if positional => {
            if let Some(at) = parameters.and_then(|p| p.position_of(name)).filter(|&at| at <= args.len()) {
                return at;
            }
            args.iter().position(|a| a.name.is_some() || a.star != Star::None).unwrap_or(args.len())
        }
        ListKind::Call => args.iter().position(|a| a.star == Star::DoubleStar).unwrap_or(args.len()),
    }
}

fn new_argument(kind: ListKind, name: &str, value: &str, positional: bool) -> Argument {
    match kind {
        ListKind::Call if positional => Argument {
            value: value.to_string(),
            prefix: " ".into(),
            ..Argument::default()
        },
        ListKind::Call => Argument {
            name: Some(name.to_string()),
            value: value.to_string(),
            prefix: " ".into(),
            ..Argument::default()
        },
        ListKind::Def => Argument {
            name: Some(name.to_string()),
            value: value.to_string(),
            prefix: " ".into(),
            ..Argument::default()
        },
    }
}

/// Handles `f()` — no existing arglist/typedargslist node to explode — by building a fresh
/// one-entry list and splicing it between the existing parens.
fn splice_first_argument(
    tree: &mut Tree,
    node: NodeId,
    name: &str,
    value: &str,
    positional: bool,
) -> Result<Option<NodeId>, QueryError> {
    let kind = if tree.node_kind(node) == Some(NonterminalKind::Funcdef) {
        ListKind::Def
    } else {
        ListKind::Call
    };
    let arg = Argument {
        name: if positional && kind == ListKind::Call { None } else { Some(name.to_string()) },
        value: value.to_string(),
        ..Argument::default()
    };
    let built = codeshift_imr::build(tree, kind, std::slice::from_ref(&arg))?;
    let parens = if kind == ListKind::Def {
        tree.children(node)[2]
    } else {
        crate::filters::call_trailer(tree, node).ok_or(QueryError::MissingParameterList)?
    };
    let mut children = tree.children(parens).to_vec();
    children.splice(1..1, built);
    tree.set_children(parens, children);
    Ok(Some(node))
}

/// Removes the argument named `name` from a call site's arglist or a definition's typedargslist.
/// A no-op (returns `Ok(None)`) if there is no such argument. Removing `*args`/`**kwargs` is
/// forbidden, whether `name` names it directly or (for a call site with only positional
/// arguments) `parameters` resolves it to the variadic slot. When `name` isn't an existing
/// keyword/parameter name but `parameters` is given, falls back to removing the positional slot
/// `parameters` describes for it, counting past `self`/`cls`/`meta`.
pub fn remove_argument(
    tree: &mut Tree,
    node: NodeId,
    _captures: &Captures,
    parameters: Option<&ParameterList>,
    name: &str,
) -> Result<Option<NodeId>, QueryError> {
    let Some((list, kind)) = list_and_kind(tree, node) else {
        return Ok(None);
    };
    let mut args = explode(tree, list)?;
    let index = match args.iter().position(|a| a.name.as_deref() == Some(name)) {
        Some(index) => Some(index),
        None if kind == ListKind::Call => described_removal_index(parameters, name, &args)?,
        None => None,
    };
    let Some(index) = index else {
        return Ok(None);
    };
    if args[index].star != Star::None {
        return Err(QueryError::CannotRemoveVariadic(name.to_string()));
    }
    args.remove(index);
    if args.is_empty() {
        let parens = if kind == ListKind::Def {
            tree.children(node)[2]
        } else {
            crate::filters::call_trailer(tree, node).ok_or(QueryError::MissingParameterList)?
        };
        let kept: Vec<NodeId> = tree.children(parens).iter().copied().filter(|&c| c != list).collect();
        tree.set_children(parens, kept);
        return Ok(Some(node));
    }
    let fresh = replace(tree, list, kind, &args)?;
    Ok(Some(fresh))
}

/// Resolves `name` to a positional slot in `args` via the described signature, counting past
/// `self`/`cls`/`meta` the way call sites don't pass them explicitly. Errors immediately if the
/// described parameter is itself `*args`/`**kwargs`, and refuses to land on `args`'s own variadic
/// entry when the signature says one exists.
fn described_removal_index(parameters: Option<&ParameterList>, name: &str, args: &[Argument]) -> Result<Option<usize>, QueryError> {
    let Some(parameters) = parameters else {
        return Ok(None);
    };
    if let Some(spec) = parameters.params.iter().find(|p| p.name == name) {
        if spec.star != ParamStar::None {
            return Err(QueryError::CannotRemoveVariadic(name.to_string()));
        }
    }
    let Some(at) = parameters.position_of(name) else {
        return Ok(None);
    };
    if parameters.has_double_star() && args.get(at).is_some_and(|a| a.star == Star::DoubleStar) {
        return Err(QueryError::CannotRemoveVariadic(name.to_string()));
    }
    Ok((at < args.len()).then_some(at))
}

/// Renames a parameter/keyword-argument and/or changes its default/value expression. Either of
/// `new_name`/`default_value` may be omitted to leave that part unchanged.
pub fn modify_argument(
    tree: &mut Tree,
    node: NodeId,
    _captures: &Captures,
    name: &str,
    new_name: Option<&str>,
    default_value: Option<&str>,
) -> Result<Option<NodeId>, QueryError> {
    let (list, kind) = list_and_kind(tree, node).ok_or_else(|| QueryError::NoSuchParameter(name.to_string()))?;
    let mut args = explode(tree, list)?;
    let Some(arg) = args.iter_mut().find(|a| a.name.as_deref() == Some(name)) else {
        return Err(QueryError::NoSuchParameter(name.to_string()));
    };
    if arg.star == Star::DoubleStar {
        return Err(QueryError::CannotRemoveVariadic(name.to_string()));
    }
    if let Some(new_name) = new_name {
        arg.name = Some(new_name.to_string());
    }
    if let Some(value) = default_value {
        arg.value = value.to_string();
    }
    let fresh = replace(tree, list, kind, &args)?;
    Ok(Some(fresh))
}

/// Renames the matched attribute to `internal_name`, then, once per class, synthesizes a
/// `@property` getter and a `@<name>.setter` setter under the original public name and appends
/// them to the end of the enclosing class body. Requires an `in_class` filter on the same
/// transform (enforced at [`crate::Query::compile`] time) since an encapsulated attribute only
/// makes sense inside a class body. A repeat match against the same public name in the same class
/// (e.g. a second assignment to it) leaves the previously synthesized accessors alone.
pub fn encapsulate(tree: &mut Tree, node: NodeId, captures: &Captures, internal_name: &str) -> Result<Option<NodeId>, QueryError> {
    if internal_name.starts_with("__") {
        return Err(QueryError::EncapsulateNameMangling(internal_name.to_string()));
    }
    let name_leaf = captured_name(captures).unwrap_or(node);
    let public_name = tree.value(name_leaf).ok_or(QueryError::EncapsulateNeedsInClass)?.to_string();
    let classdef = enclosing_class(tree, node).ok_or(QueryError::EncapsulateNeedsInClass)?;
    rename(tree, node, captures, internal_name)?;

    let suite = class_suite(tree, classdef);
    if !has_accessor(tree, suite, &public_name) {
        let indent = indent_prefix(tree, suite);
        let getter = build_property_getter(tree, &public_name, internal_name, &indent);
        let setter = build_property_setter(tree, &public_name, internal_name, &indent);
        tree.append_child(suite, getter);
        tree.append_child(suite, setter);
    }
    Ok(None)
}

fn enclosing_class(tree: &Tree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node).find(|&ancestor| tree.node_kind(ancestor) == Some(NonterminalKind::Classdef))
}

fn class_suite(tree: &Tree, classdef: NodeId) -> NodeId {
    *tree.children(classdef).last().expect("a classdef always ends with its suite")
}

fn has_accessor(tree: &Tree, suite: NodeId, public_name: &str) -> bool {
    tree.children(suite).iter().any(|&stmt| {
        tree.node_kind(stmt) == Some(NonterminalKind::Decorated) && decorated_funcdef_name(tree, stmt).as_deref() == Some(public_name)
    })
}

fn decorated_funcdef_name(tree: &Tree, decorated: NodeId) -> Option<String> {
    let funcdef = *tree.children(decorated).get(1)?;
    if tree.node_kind(funcdef) != Some(NonterminalKind::Funcdef) {
        return None;
    }
    let name = *tree.children(funcdef).get(1)?;
    tree.value(name).map(str::to_string)
}

/// The prefix (leading whitespace, including the newline) a fresh statement appended to `suite`
/// should carry, copied from the suite's last existing statement so the new one lines up.
fn indent_prefix(tree: &Tree, suite: NodeId) -> String {
    tree.children(suite)
        .last()
        .and_then(|&stmt| tree.leaves(stmt).next())
        .and_then(|leaf| tree.prefix(leaf))
        .map(str::to_string)
        .unwrap_or_else(|| "\n    ".to_string())
}

/// One indent level deeper than `indent` (same unit, doubled), for a new method body's own
/// statements.
fn nested_indent(indent: &str) -> String {
    match indent.rfind('\n') {
        Some(at) => {
            let (line_prefix, unit) = indent.split_at(at + 1);
            format!("{line_prefix}{unit}{unit}")
        }
        None => format!("{indent}{indent}"),
    }
}

/// Builds `@a` (one segment) or `@a.b` (more), for a decorator whose name is `dotted`.
fn build_decorator(tree: &mut Tree, dotted: Vec<(&str, &str)>, indent: &str) -> NodeId {
    let at = tree.new_leaf(TokenKind::At, "@", indent.to_string());
    let mut segments = Vec::with_capacity(dotted.len() * 2 - 1);
    for (i, (value, prefix)) in dotted.into_iter().enumerate() {
        if i > 0 {
            segments.push(tree.new_leaf(TokenKind::Dot, ".", ""));
        }
        segments.push(tree.new_leaf(TokenKind::Name, value, prefix));
    }
    let name = if segments.len() == 1 { segments.pop().unwrap() } else { tree.new_node(NonterminalKind::DottedName, segments) };
    tree.new_node(NonterminalKind::Decorator, vec![at, name])
}

fn self_attribute_access(tree: &mut Tree, internal_name: &str, prefix: &str) -> NodeId {
    let self_leaf = tree.new_leaf(TokenKind::Name, "self", prefix.to_string());
    let dot = tree.new_leaf(TokenKind::Dot, ".", "");
    let attr = tree.new_leaf(TokenKind::Name, internal_name, "");
    let trailer = tree.new_node(NonterminalKind::Trailer, vec![dot, attr]);
    tree.new_node(NonterminalKind::Power, vec![self_leaf, trailer])
}

fn build_parameters(tree: &mut Tree, extra: Option<&str>) -> NodeId {
    let lpar = tree.new_leaf(TokenKind::LPar, "(", "");
    let self_param = tree.new_leaf(TokenKind::Name, "self", "");
    let mut params = vec![self_param];
    if let Some(extra) = extra {
        params.push(tree.new_leaf(TokenKind::Comma, ",", ""));
        params.push(tree.new_leaf(TokenKind::Name, extra, " "));
    }
    let typedargslist = tree.new_node(NonterminalKind::Typedargslist, params);
    let rpar = tree.new_leaf(TokenKind::RPar, ")", "");
    tree.new_node(NonterminalKind::Parameters, vec![lpar, typedargslist, rpar])
}

fn build_property_getter(tree: &mut Tree, public_name: &str, internal_name: &str, indent: &str) -> NodeId {
    let decorator = build_decorator(tree, vec![("property", "")], indent);
    let decorators = tree.new_node(NonterminalKind::Decorators, vec![decorator]);

    let def_kw = tree.new_leaf(TokenKind::Name, "def", indent.to_string());
    let name = tree.new_leaf(TokenKind::Name, public_name, " ");
    let parameters = build_parameters(tree, None);
    let colon = tree.new_leaf(TokenKind::Colon, ":", "");

    let body_indent = nested_indent(indent);
    let return_kw = tree.new_leaf(TokenKind::Name, "return", body_indent);
    let value = self_attribute_access(tree, internal_name, " ");
    let return_stmt = tree.new_node(NonterminalKind::ReturnStmt, vec![return_kw, value]);
    let simple_stmt = tree.new_node(NonterminalKind::SimpleStmt, vec![return_stmt]);
    let suite = tree.new_node(NonterminalKind::Suite, vec![simple_stmt]);

    let funcdef = tree.new_node(NonterminalKind::Funcdef, vec![def_kw, name, parameters, colon, suite]);
    tree.new_node(NonterminalKind::Decorated, vec![decorators, funcdef])
}

fn build_property_setter(tree: &mut Tree, public_name: &str, internal_name: &str, indent: &str) -> NodeId {
    let decorator = build_decorator(tree, vec![(public_name, ""), ("setter", "")], indent);
    let decorators = tree.new_node(NonterminalKind::Decorators, vec![decorator]);

    let def_kw = tree.new_leaf(TokenKind::Name, "def", indent.to_string());
    let name = tree.new_leaf(TokenKind::Name, public_name, " ");
    let parameters = build_parameters(tree, Some("value"));
    let colon = tree.new_leaf(TokenKind::Colon, ":", "");

    let body_indent = nested_indent(indent);
    let lhs = self_attribute_access(tree, internal_name, &body_indent);
    let equal = tree.new_leaf(TokenKind::Equal, "=", " ");
    let rhs = tree.new_leaf(TokenKind::Name, "value", " ");
    let expr_stmt = tree.new_node(NonterminalKind::ExprStmt, vec![lhs, equal, rhs]);
    let simple_stmt = tree.new_node(NonterminalKind::SimpleStmt, vec![expr_stmt]);
    let suite = tree.new_node(NonterminalKind::Suite, vec![simple_stmt]);

    let funcdef = tree.new_node(NonterminalKind::Funcdef, vec![def_kw, name, parameters, colon, suite]);
    tree.new_node(NonterminalKind::Decorated, vec![decorators, funcdef])
}

#[cfg(test)]
mod test {
    use super::*;
    use codeshift_cst::pattern::find_all;
    use codeshift_fixture_lang::parse;

    fn matched(src: &str, name: &str) -> (Tree, NodeId, Captures) {
        let tree = parse(src).unwrap();
        let pattern = codeshift_selectors::function(name).unwrap();
        let matches = find_all(&tree, &pattern);
        assert_eq!(matches.len(), 1);
        (tree, matches[0].root, matches[0].captures.clone())
    }

    #[test]
    fn rename_rewrites_captured_name_leaf() {
        let (mut tree, root, captures) = matched("def greet(name):\n    pass\n", "greet");
        rename(&mut tree, root, &captures, "say_hello").unwrap();
        assert!(tree.text(tree.root()).contains("def say_hello(name):"));
    }

    #[test]
    fn add_argument_appends_keyword_to_existing_call() {
        let (mut tree, root, captures) = matched("greet(name)\n", "greet");
        let replacement = add_argument(&mut tree, root, &captures, None, "timeout", "30", false).unwrap();
        assert!(replacement.is_some());
        assert!(tree.text(tree.root()).contains("greet(name, timeout=30)"));
    }

    #[test]
    fn add_argument_splices_into_empty_call() {
        let (mut tree, root, captures) = matched("greet()\n", "greet");
        add_argument(&mut tree, root, &captures, None, "name", "'world'", true).unwrap();
        assert!(tree.text(tree.root()).contains("greet('world')"));
    }

    #[test]
    fn add_argument_keyword_lands_before_double_star() {
        let (mut tree, root, captures) = matched("greet(z=1, **a)\n", "greet");
        add_argument(&mut tree, root, &captures, None, "x", "5", false).unwrap();
        assert!(tree.text(tree.root()).contains("greet(z=1, x=5, **a)"));
    }

    #[test]
    fn add_argument_definition_lands_before_first_default() {
        let (mut tree, root, captures) = matched("def greet(name, timeout=5):\n    pass\n", "greet");
        add_argument(&mut tree, root, &captures, None, "retries", "3", false).unwrap();
        assert!(tree.text(tree.root()).contains("def greet(name, retries=3, timeout=5):"));
    }

    #[test]
    fn remove_argument_drops_named_keyword() {
        let (mut tree, root, captures) = matched("greet(name, timeout=30)\n", "greet");
        let replacement = remove_argument(&mut tree, root, &captures, None, "timeout").unwrap();
        assert!(replacement.is_some());
        assert!(tree.text(tree.root()).contains("greet(name)"));
        assert!(!tree.text(tree.root()).contains("timeout"));
    }

    #[test]
    fn remove_argument_is_noop_when_absent() {
        let (mut tree, root, captures) = matched("greet(name)\n", "greet");
        let replacement = remove_argument(&mut tree, root, &captures, None, "timeout").unwrap();
        assert!(replacement.is_none());
    }

    #[test]
    fn remove_argument_rejects_double_star_by_name() {
        let (mut tree, root, captures) = matched("greet(name, **kwargs)\n", "greet");
        let err = remove_argument(&mut tree, root, &captures, None, "kwargs").unwrap_err();
        assert!(matches!(err, QueryError::CannotRemoveVariadic(_)));
    }

    #[test]
    fn remove_argument_uses_described_position_for_positional_only_call() {
        let (mut tree, root, captures) = matched("greet(name, 30)\n", "greet");
        let params = ParameterList::new(vec![
            ParamSpec { name: "self".into(), has_default: false, star: ParamStar::None },
            ParamSpec { name: "name".into(), has_default: false, star: ParamStar::None },
            ParamSpec { name: "timeout".into(), has_default: true, star: ParamStar::None },
        ]);
        remove_argument(&mut tree, root, &captures, Some(&params), "timeout").unwrap();
        assert!(tree.text(tree.root()).contains("greet(name)"));
    }

    #[test]
    fn modify_argument_renames_and_changes_default() {
        let (mut tree, root, captures) = matched("def greet(name, timeout=5):\n    pass\n", "greet");
        modify_argument(&mut tree, root, &captures, "timeout", Some("retries"), Some("3")).unwrap();
        assert!(tree.text(tree.root()).contains("retries=3"));
    }

    #[test]
    fn encapsulate_rejects_dunder_style_name() {
        let (mut tree, root, captures) = matched("class Dog:\n    def bark(self):\n        pass\n", "bark");
        let err = encapsulate(&mut tree, root, &captures, "__bark").unwrap_err();
        assert!(matches!(err, QueryError::EncapsulateNameMangling(_)));
    }

    #[test]
    fn encapsulate_renames_attribute_and_synthesizes_accessors() {
        let tree = parse("class Dog:\n    weight = 10\n").unwrap();
        let pattern = codeshift_selectors::attribute("weight").unwrap();
        let matches = find_all(&tree, &pattern);
        assert_eq!(matches.len(), 1);
        let mut tree = tree;
        let captures = matches[0].captures.clone();
        encapsulate(&mut tree, matches[0].root, &captures, "_weight").unwrap();

        let text = tree.text(tree.root());
        assert!(text.contains("_weight = 10"));
        assert!(text.contains("@property"));
        assert!(text.contains("def weight(self):"));
        assert!(text.contains("return self._weight"));
        assert!(text.contains("@weight.setter"));
        assert!(text.contains("def weight(self, value):"));
        assert!(text.contains("self._weight = value"));
    }

    #[test]
    fn encapsulate_synthesizes_accessors_once_per_class() {
        let tree =
            parse("class Dog:\n    def __init__(self):\n        self.weight = 10\n\n    def reset(self):\n        self.weight = 0\n").unwrap();
        let pattern = codeshift_selectors::attribute("weight").unwrap();
        let matches = find_all(&tree, &pattern);
        assert_eq!(matches.len(), 2);
        let mut tree = tree;
        for m in &matches {
            encapsulate(&mut tree, m.root, &m.captures, "_weight").unwrap();
        }
        let text = tree.text(tree.root());
        assert_eq!(text.matches("def weight(self):").count(), 1);
        assert_eq!(text.matches("@weight.setter").count(), 1);
        assert!(text.contains("self._weight = 10"));
        assert!(text.contains("self._weight = 0"));
    }
}
