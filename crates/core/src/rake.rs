//! The module pass, the chunk pass, and both together.
//!
//! - [`transform`] parses the source with tree-sitter and removes `debugger` statements and
//!   `console.<method>(...)` calls.
//! - [`render_chunk`] removes comments by category.
//! - [`rake_all`] runs both on a single [`Raker`], so one map covers every removal.
//!
//! Each returns `Ok(None)` when it leaves the source untouched.
//!
//! Only matches that stand as statements of their own are removed: a `debugger` statement
//! directly inside a statement list, or a console call forming an entire expression statement
//! directly inside one. Anything else (`if (x) debugger;`, `a && console.log(a)`) would leave
//! its parent without a required child, so it is left in place and logged at debug level.

use tracing::debug;

use crate::{
    RakeError,
    classify::classify,
    options::Config,
    parse::parse_javascript,
    range::{NodeKind, NodeSpan, ParentKind},
    raker::Raker,
};

/// Output code and its corresponding sourcemap JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RakeOutput {
    /// The raked source.
    pub code: String,
    /// Sourcemap JSON mapping `code` back to the input.
    pub map: String,
}

/// Node kinds whose children are statements.
const STATEMENT_LISTS: &[&str] = &[
    "program",
    "statement_block",
    "class_static_block",
    "switch_case",
    "switch_default",
];

/// Remove `debugger` statements and `console` calls.
///
/// Returns `Ok(None)` without parsing when `config` removes neither.
pub fn transform(
    code: &str,
    source_name: &str,
    config: &Config,
) -> Result<Option<RakeOutput>, RakeError> {
    if !config.removes_nodes() {
        return Ok(None);
    }

    let mut raker = Raker::new(code).with_source_name(source_name);
    rake_nodes(&mut raker, config)?;
    finish(raker)
}

/// Remove comments according to `config`. Meaningless comments are always removed.
pub fn render_chunk(
    code: &str,
    source_name: &str,
    config: &Config,
) -> Result<Option<RakeOutput>, RakeError> {
    let mut raker = Raker::new(code).with_source_name(source_name);
    rake_comments(&mut raker, config)?;
    finish(raker)
}

/// [`transform`] and [`render_chunk`] in one pass over the same input.
pub fn rake_all(
    code: &str,
    source_name: &str,
    config: &Config,
) -> Result<Option<RakeOutput>, RakeError> {
    let mut raker = Raker::new(code).with_source_name(source_name);
    if config.removes_nodes() {
        rake_nodes(&mut raker, config)?;
    }
    rake_comments(&mut raker, config)?;
    finish(raker)
}

fn finish(mut raker: Raker) -> Result<Option<RakeOutput>, RakeError> {
    if !raker.has_changed() {
        return Ok(None);
    }
    let code = raker.to_code();
    let map = raker.generate_map_json()?;
    Ok(Some(RakeOutput { code, map }))
}

fn rake_comments(raker: &mut Raker, config: &Config) -> Result<(), RakeError> {
    raker.rake_comments(|raw| config.remove_comment(classify(raw), raw))?;
    Ok(())
}

fn rake_nodes(raker: &mut Raker, config: &Config) -> Result<(), RakeError> {
    let tree = parse_javascript(raker.source())?;
    let matches = collect_nodes(raker.source(), tree.root_node(), config);
    debug!(matches = matches.len(), "collected nodes");
    for (node, parent) in matches {
        raker.rake_ast_node(node, parent)?;
    }
    Ok(())
}

/// Walk the tree and collect the nodes to remove. Removed nodes are not descended into.
fn collect_nodes(
    source: &str,
    root: tree_sitter::Node<'_>,
    config: &Config,
) -> Vec<(NodeSpan, ParentKind)> {
    let mut found = Vec::new();

    let mut cursor = root.walk();
    'walk: loop {
        let current = cursor.node();
        let matched = match current.kind() {
            "debugger_statement" if config.debugger => match_debugger(current),
            "call_expression" if config.console.is_some() => match_console(source, current, config),
            _ => None,
        };

        let descend = match matched {
            Some(m) => {
                found.push(m);
                false
            }
            None => true,
        };

        if descend && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    found
}

fn match_debugger(node: tree_sitter::Node<'_>) -> Option<(NodeSpan, ParentKind)> {
    if !in_statement_list(node) {
        debug!(start = node.start_byte(), "left debugger statement in place");
        return None;
    }
    Some((span(node, NodeKind::Statement), ParentKind::StatementList))
}

fn match_console(
    source: &str,
    call: tree_sitter::Node<'_>,
    config: &Config,
) -> Option<(NodeSpan, ParentKind)> {
    let method = console_method(source, call)?;
    let statement = source.get(call.byte_range())?;
    if !config.remove_console(method, statement) {
        return None;
    }

    let parent = call.parent()?;
    if parent.kind() != "expression_statement" || !in_statement_list(parent) {
        debug!(
            start = call.start_byte(),
            method,
            "left console call in place"
        );
        return None;
    }
    Some((span(call, NodeKind::Expression), ParentKind::ExpressionStatement))
}

/// `log` for `console.log(...)`; `None` for any other call.
fn console_method<'s>(source: &'s str, call: tree_sitter::Node<'_>) -> Option<&'s str> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "member_expression" {
        return None;
    }
    let object = callee.child_by_field_name("object")?;
    if object.kind() != "identifier" || source.get(object.byte_range())? != "console" {
        return None;
    }
    let property = callee.child_by_field_name("property")?;
    if property.kind() != "property_identifier" {
        return None;
    }
    source.get(property.byte_range())
}

fn in_statement_list(node: tree_sitter::Node<'_>) -> bool {
    node.parent()
        .is_some_and(|p| STATEMENT_LISTS.contains(&p.kind()))
}

fn span(node: tree_sitter::Node<'_>, kind: NodeKind) -> NodeSpan {
    NodeSpan {
        start: node.start_byte(),
        end: node.end_byte(),
        kind,
    }
}
