use std::ops::Range;

/// Closed set of node kinds the patching engine reasons about.
///
/// Everything else in the grammar collapses to [`NodeKind::Other`]; the original grammar kind is
/// kept on the node for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ImportDeclaration,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    NamespaceImport,
    StringLiteral,
    Identifier,
    VariableStatement,
    VariableDeclarator,
    ExportStatement,
    ObjectLiteral,
    Property,
    ShorthandProperty,
    ArrayLiteral,
    Call,
    ArgumentList,
    MemberExpression,
    Decorator,
    Comment,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Other,
}

impl NodeKind {
    pub fn from_grammar(kind: &str) -> Self {
        match kind {
            "program" => NodeKind::Program,
            "import_statement" => NodeKind::ImportDeclaration,
            "import_clause" => NodeKind::ImportClause,
            "named_imports" => NodeKind::NamedImports,
            "import_specifier" => NodeKind::ImportSpecifier,
            "namespace_import" => NodeKind::NamespaceImport,
            "string" => NodeKind::StringLiteral,
            "identifier" | "property_identifier" | "type_identifier" => NodeKind::Identifier,
            "lexical_declaration" | "variable_declaration" => NodeKind::VariableStatement,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "export_statement" => NodeKind::ExportStatement,
            "object" => NodeKind::ObjectLiteral,
            "pair" => NodeKind::Property,
            "shorthand_property_identifier" => NodeKind::ShorthandProperty,
            "array" => NodeKind::ArrayLiteral,
            "call_expression" => NodeKind::Call,
            "arguments" => NodeKind::ArgumentList,
            "member_expression" => NodeKind::MemberExpression,
            "decorator" => NodeKind::Decorator,
            "comment" => NodeKind::Comment,
            "{" => NodeKind::OpenBrace,
            "}" => NodeKind::CloseBrace,
            "[" => NodeKind::OpenBracket,
            "]" => NodeKind::CloseBracket,
            "(" => NodeKind::OpenParen,
            ")" => NodeKind::CloseParen,
            "," => NodeKind::Comma,
            ";" => NodeKind::Semicolon,
            _ => NodeKind::Other,
        }
    }

    /// Delimiters, separators and comments: nodes that never carry a value of their own.
    pub fn is_punctuation_or_trivia(self) -> bool {
        matches!(
            self,
            NodeKind::Comment
                | NodeKind::OpenBrace
                | NodeKind::CloseBrace
                | NodeKind::OpenBracket
                | NodeKind::CloseBracket
                | NodeKind::OpenParen
                | NodeKind::CloseParen
                | NodeKind::Comma
                | NodeKind::Semicolon
        )
    }
}

/// One node of an owned structural tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub(crate) kind: NodeKind,
    pub(crate) grammar_kind: &'static str,
    pub(crate) span: Range<usize>,
    pub(crate) field: Option<&'static str>,
    pub(crate) children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The tree-sitter kind this node was built from.
    pub fn grammar_kind(&self) -> &'static str {
        self.grammar_kind
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Grammar field under which the parent holds this node (`name`, `value`, `source`, ...).
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    pub fn first_child_of(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn last_child_of(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().rev().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Children that are not punctuation or comments.
    pub fn significant_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children
            .iter()
            .filter(|c| !c.kind.is_punctuation_or_trivia())
    }

    /// Pre-order traversal including `self`, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode {
            kind,
            grammar_kind: "test",
            span: start..end,
            field: None,
            children: vec![],
        }
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut inner = leaf(NodeKind::ObjectLiteral, 2, 8);
        inner.children = vec![
            leaf(NodeKind::OpenBrace, 2, 3),
            leaf(NodeKind::CloseBrace, 7, 8),
        ];
        let mut root = leaf(NodeKind::Program, 0, 10);
        root.children = vec![leaf(NodeKind::Identifier, 0, 1), inner];

        let kinds: Vec<NodeKind> = root.descendants().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Program,
                NodeKind::Identifier,
                NodeKind::ObjectLiteral,
                NodeKind::OpenBrace,
                NodeKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn grammar_mapping_collapses_unknown_kinds() {
        assert_eq!(NodeKind::from_grammar("object"), NodeKind::ObjectLiteral);
        assert_eq!(NodeKind::from_grammar("type_identifier"), NodeKind::Identifier);
        assert_eq!(NodeKind::from_grammar("arrow_function"), NodeKind::Other);
        assert!(NodeKind::Comma.is_punctuation_or_trivia());
        assert!(!NodeKind::Property.is_punctuation_or_trivia());
    }
}
