use std::cell::RefCell;

use tree_sitter::Parser;

use crate::RakeError;

thread_local! {
    /// Shared Tree-sitter parser instance. We reuse it to avoid reloading the language for each call.
    static JAVASCRIPT_PARSER: RefCell<Parser> = {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        parser
            .set_language(&language)
            .expect("tree-sitter-javascript language load failed");
        RefCell::new(parser)
    };
}

/// Parse JavaScript source.
///
/// Fails with [`RakeError::ParseFailed`] when tree-sitter gives up or the tree contains syntax
/// errors; byte ranges taken from an error-recovered tree are not safe to cut.
pub fn parse_javascript(source: &str) -> Result<tree_sitter::Tree, RakeError> {
    let tree = JAVASCRIPT_PARSER
        .with(|p| {
            let mut parser = p.borrow_mut();
            parser.parse(source, None)
        })
        .ok_or(RakeError::ParseFailed)?;

    if tree.root_node().has_error() {
        return Err(RakeError::ParseFailed);
    }
    Ok(tree)
}
