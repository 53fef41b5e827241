// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parameterized pattern templates for the code shapes a refactor reaches for most often.
//!
//! Each function here renders pattern-DSL text (ยง4.1 of `codeshift_cst::pattern`) and compiles
//! it, so callers never have to hand-write `funcdef< 'def' name=NAME any* >` themselves for the
//! common cases. [`pattern`] is the escape hatch for anything the templates don't cover: it
//! compiles caller-supplied pattern text directly.

use codeshift_cst::pattern::{Pattern, PatternError, compile};

/// Escapes `value` as a pattern-language string literal (`'...'`), so a name containing a quote
/// can't break the generated pattern text.
#[must_use]
pub fn quoted_parts(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Renders a dotted name (`a.b.c`) as the pattern text matching that attribute chain: a bare
/// quoted literal for a single part, or a `power< 'a' trailer< '.' 'b' > ... >` anchor for more.
#[must_use]
pub fn dotted_parts(dotted_name: &str) -> String {
    let parts: Vec<&str> = dotted_name.split('.').collect();
    let Some((first, rest)) = parts.split_first() else {
        return quoted_parts(dotted_name);
    };
    if rest.is_empty() {
        return quoted_parts(first);
    }
    let trailers: String = rest
        .iter()
        .map(|part| format!("trailer< '.' {} >", quoted_parts(part)))
        .collect::<Vec<_>>()
        .join(" ");
    format!("power< {} {trailers} >", quoted_parts(first))
}

/// Renders a `power< base trailer... >` anchor from pre-rendered trailer fragments, or just
/// `base` when there are none.
#[must_use]
pub fn power_parts(base: &str, trailers: &[String]) -> String {
    if trailers.is_empty() {
        base.to_string()
    } else {
        format!("power< {base} {} >", trailers.join(" "))
    }
}

/// Renders a dotted name in statement position (`import a.b.c`, `from a.b import c`) as the
/// pattern text matching it: a bare quoted literal for one segment, or a
/// `dotted_name< 'a' '.' 'b' ... >` anchor for more, mirroring how `parse_dotted_name` only
/// wraps in a `DottedName` node once a dot is actually present.
#[must_use]
pub fn dotted_name_parts(dotted_name: &str) -> String {
    let parts: Vec<&str> = dotted_name.split('.').collect();
    let Some((first, rest)) = parts.split_first() else {
        return quoted_parts(dotted_name);
    };
    if rest.is_empty() {
        return quoted_parts(first);
    }
    let mut inner = quoted_parts(first);
    for part in rest {
        inner.push_str(" '.' ");
        inner.push_str(&quoted_parts(part));
    }
    format!("dotted_name< {inner} >")
}

/// Matches the whole file: the root `file_input` node.
pub fn root() -> Result<Pattern, PatternError> {
    compile("file_input< any* >")
}

/// Matches a reference to the dotted module path `dotted_name`, bound to the capture `name`:
/// a plain `import a.b`, a `from a.b import ...`, an `import a.b as c` alias, or an attribute-chain
/// call site `a.b(...)`.
pub fn module(dotted_name: &str) -> Result<Pattern, PatternError> {
    let dotted = dotted_name_parts(dotted_name);
    let parts: Vec<&str> = dotted_name.split('.').collect();
    let (first, rest) = parts.split_first().expect("split('.') always yields at least one part");
    let mut call_trailers: Vec<String> = rest.iter().map(|part| format!("trailer< '.' {} >", quoted_parts(part))).collect();
    call_trailers.push("trailer< '(' any* ')' >".to_string());
    let call_site = format!("name={}", power_parts(&quoted_parts(first), &call_trailers));
    compile(&format!(
        "import_name< 'import' any* (name={dotted} | dotted_as_name< name={dotted} 'as' any* >) any* > \
         | import_from< 'from' name={dotted} 'import' any* > \
         | {call_site}"
    ))
}

/// Matches a classdef whose base list contains `name` (`class X(name): ...`), bound to the
/// occurrence of `name` in the base list.
fn subclass_pattern(name: &str) -> String {
    format!(
        "classdef< 'class' any* arglist< any* argument< name={} > any* > any* >",
        quoted_parts(name)
    )
}

/// Matches a class definition named `name`: the `classdef` itself, a call site `name(...)`,
/// `name` appearing in another class's base list, or `from ... import name`.
pub fn class(name: &str) -> Result<Pattern, PatternError> {
    let q = quoted_parts(name);
    compile(&format!(
        "classdef< 'class' name={q} any* > \
         | power< name={q} trailer< '(' any* ')' > any* > \
         | {subclass} \
         | import_from< 'from' any* 'import' import_as_names< any* name={q} any* > >",
        subclass = subclass_pattern(name),
    ))
}

/// Matches a class definition whose base list contains `name`.
pub fn subclass(name: &str) -> Result<Pattern, PatternError> {
    compile(&subclass_pattern(name))
}

/// Matches an attribute named `name`: an assignment in a class body (`name = value`), a dotted
/// attribute assignment (`obj.name = value`), or a dotted attribute access (`obj.name`),
/// regardless of what `obj` is.
pub fn attribute(name: &str) -> Result<Pattern, PatternError> {
    let q = quoted_parts(name);
    compile(&format!(
        "classdef< any* suite< any* simple_stmt< expr_stmt< name={q} '=' any* > > any* > any* > \
         | expr_stmt< power< any* trailer< '.' name={q} > > '=' any* > \
         | power< any* trailer< '.' name={q} > any* >"
    ))
}

/// Matches a method named `method_name` defined in the body of class `class_name`.
pub fn method(class_name: &str, method_name: &str) -> Result<Pattern, PatternError> {
    compile(&format!(
        "classdef< 'class' {} any* suite< any* funcdef< 'def' name={} any* > any* > >",
        quoted_parts(class_name),
        quoted_parts(method_name)
    ))
}

/// Matches a (free or method) function definition OR a call site named `name`, bound to the
/// capture `name` either way. `Transform::is_def`/`Transform::is_call` (in `codeshift-query`)
/// tell the two branches apart by the match root's own node kind — `funcdef` for a definition,
/// `power` for a call site — rather than anything recorded here.
pub fn function(name: &str) -> Result<Pattern, PatternError> {
    compile(&format!(
        "funcdef< 'def' name={} any* > | power< name={} trailer< '(' any* ')' > >",
        quoted_parts(name),
        quoted_parts(name)
    ))
}

/// Matches a bare name leaf with the exact text `name` (a variable reference or binding).
pub fn var(name: &str) -> Result<Pattern, PatternError> {
    compile(&quoted_parts(name))
}

/// Compiles caller-supplied pattern text directly, for shapes none of the templates above cover.
pub fn pattern(text: &str) -> Result<Pattern, PatternError> {
    compile(text)
}

#[cfg(test)]
mod test {
    use super::*;
    use codeshift_cst::pattern::find_all;
    use codeshift_fixture_lang::parse;

    #[test]
    fn function_selector_matches_named_def() {
        let tree = parse("def greet(name):\n    return name\n").unwrap();
        let p = function("greet").unwrap();
        assert_eq!(find_all(&tree, &p).len(), 1);
        let wrong = function("farewell").unwrap();
        assert!(find_all(&tree, &wrong).is_empty());
    }

    #[test]
    fn function_selector_also_matches_call_site() {
        let tree = parse("greet(name)\n").unwrap();
        let p = function("greet").unwrap();
        assert_eq!(find_all(&tree, &p).len(), 1);
    }

    #[test]
    fn class_selector_matches_named_class() {
        let tree = parse("class Dog:\n    def bark(self):\n        pass\n").unwrap();
        let p = class("Dog").unwrap();
        assert_eq!(find_all(&tree, &p).len(), 1);
    }

    #[test]
    fn subclass_selector_requires_matching_base() {
        let tree = parse("class Dog(Animal):\n    pass\n").unwrap();
        let p = subclass("Animal").unwrap();
        assert_eq!(find_all(&tree, &p).len(), 1);
        let wrong = subclass("Plant").unwrap();
        assert!(find_all(&tree, &wrong).is_empty());
    }

    #[test]
    fn class_selector_matches_subclass_base_and_import() {
        let tree = parse("class Dog(Animal):\n    pass\n").unwrap();
        assert_eq!(find_all(&tree, &class("Animal").unwrap()).len(), 1);
        let tree = parse("from animals import Dog\n").unwrap();
        assert_eq!(find_all(&tree, &class("Dog").unwrap()).len(), 1);
        let tree = parse("Dog()\n").unwrap();
        assert_eq!(find_all(&tree, &class("Dog").unwrap()).len(), 1);
    }

    #[test]
    fn module_selector_matches_import_forms() {
        assert_eq!(find_all(&parse("import os.path\n").unwrap(), &module("os.path").unwrap()).len(), 1);
        assert_eq!(find_all(&parse("import os.path as p\n").unwrap(), &module("os.path").unwrap()).len(), 1);
        assert_eq!(find_all(&parse("from os.path import join\n").unwrap(), &module("os.path").unwrap()).len(), 1);
        assert_eq!(find_all(&parse("os.path.join('a')\n").unwrap(), &module("os.path").unwrap()).len(), 1);
    }

    #[test]
    fn attribute_selector_matches_dotted_access() {
        let tree = parse("value = obj.attr\n").unwrap();
        assert_eq!(find_all(&tree, &attribute("attr").unwrap()).len(), 1);
    }

    #[test]
    fn attribute_selector_matches_class_body_assignment() {
        let tree = parse("class Dog:\n    attr = 1\n").unwrap();
        assert_eq!(find_all(&tree, &attribute("attr").unwrap()).len(), 1);
    }

    #[test]
    fn method_selector_finds_nested_function() {
        let tree = parse("class Dog:\n    def bark(self):\n        pass\n").unwrap();
        let p = method("Dog", "bark").unwrap();
        assert_eq!(find_all(&tree, &p).len(), 1);
    }

    #[test]
    fn dotted_parts_renders_single_and_multi_segment_names() {
        assert_eq!(dotted_parts("os"), "'os'");
        assert_eq!(dotted_parts("os.path"), "power< 'os' trailer< '.' 'path' > >");
    }

    #[test]
    fn quoted_parts_escapes_embedded_quote() {
        assert_eq!(quoted_parts("it's"), "'it\\'s'");
    }
}
