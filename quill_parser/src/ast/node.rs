use crate::token::{Token, TokenType};
use serde::Serialize;

/// Source position of a node.
pub trait Positioner {
    /// 1-based line of the first character.
    fn line(&self) -> usize;
    /// 1-based column of the first character.
    fn col(&self) -> usize;
    /// Byte offset of the first character.
    fn offset(&self) -> usize;
}

/// Extent of a node in bytes.
pub trait Lengther {
    /// Length in bytes.
    fn length(&self) -> usize;
}

/// Grammar production or token kind of a node.
pub trait Typer {
    /// The node type tag.
    fn node_type(&self) -> NodeType;
}

/// Optional text of a node. The empty string means "no value".
pub trait Valuer {
    /// The text, or `""`.
    fn value(&self) -> &str;

    /// Reports whether [`Valuer::value`] is non-empty.
    fn has_value(&self) -> bool {
        !self.value().is_empty()
    }
}

/// Capability set shared by every AST node and every token.
pub trait Node: Positioner + Lengther + Typer + Valuer {}

impl<T: Positioner + Lengther + Typer + Valuer> Node for T {}

/// Type tag of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum NodeType {
    Root,
    QueryExpression,
    WithClause,
    WithListElement,
    ColumnNameList,
    SearchOrCycleClause,
    SearchClause,
    CycleClause,
    QueryExpressionBody,
    QueryTerm,
    QueryPrimary,
    SimpleTable,
    TableValueConstructor,
    ExplicitTable,
    CorrespondingSpec,
    QuerySpecification,
    SelectList,
    SelectSublist,
    DerivedColumn,
    AsClause,
    QualifiedAsterisk,
    TableExpression,
    FromClause,
    TableReference,
    TablePrimary,
    Correlation,
    JoinedTable,
    JoinSpecification,
    WhereClause,
    GroupByClause,
    GroupingElement,
    HavingClause,
    OrderByClause,
    SortSpecification,
    ResultOffsetClause,
    FetchFirstClause,
    SimpleValueSpecification,
    Subquery,
    Identifier,
    IdentifierChain,
    ValueExpression,
    Literal,
    CaseExpression,
    WhenClause,
    CastSpecification,
    DataType,
    RoutineInvocation,
    /// A bare token.
    Terminal(TokenType),
}

/// Position, length, type and value of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    /// Byte offset.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
    /// Type tag.
    pub typ: NodeType,
    /// Text, or `""`.
    pub value: String,
}

impl NodeInfo {
    /// Construct node metadata.
    pub fn new(
        line: usize,
        col: usize,
        offset: usize,
        length: usize,
        typ: NodeType,
        value: impl Into<String>,
    ) -> Self {
        Self { line, col, offset, length, typ, value: value.into() }
    }

    /// Metadata spanning `first` through `last`.
    pub fn spanning(typ: NodeType, first: &Token, last: &Token, value: impl Into<String>) -> Self {
        Self::new(
            first.line,
            first.col,
            first.offset,
            last.end().saturating_sub(first.offset),
            typ,
            value,
        )
    }

    /// Byte offset just past the node.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl Positioner for NodeInfo {
    fn line(&self) -> usize {
        self.line
    }
    fn col(&self) -> usize {
        self.col
    }
    fn offset(&self) -> usize {
        self.offset
    }
}

impl Lengther for NodeInfo {
    fn length(&self) -> usize {
        self.length
    }
}

impl Typer for NodeInfo {
    fn node_type(&self) -> NodeType {
        self.typ
    }
}

impl Valuer for NodeInfo {
    fn value(&self) -> &str {
        &self.value
    }
}

impl Positioner for Token {
    fn line(&self) -> usize {
        self.line
    }
    fn col(&self) -> usize {
        self.col
    }
    fn offset(&self) -> usize {
        self.offset
    }
}

impl Lengther for Token {
    fn length(&self) -> usize {
        self.length
    }
}

impl Typer for Token {
    fn node_type(&self) -> NodeType {
        NodeType::Terminal(self.typ)
    }
}

impl Valuer for Token {
    fn value(&self) -> &str {
        &self.value
    }
}

/// Implements the node capability set for structs with a `node: NodeInfo` field.
macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::ast::Positioner for $ty {
                fn line(&self) -> usize {
                    self.node.line
                }
                fn col(&self) -> usize {
                    self.node.col
                }
                fn offset(&self) -> usize {
                    self.node.offset
                }
            }

            impl $crate::ast::Lengther for $ty {
                fn length(&self) -> usize {
                    self.node.length
                }
            }

            impl $crate::ast::Typer for $ty {
                fn node_type(&self) -> $crate::ast::NodeType {
                    self.node.typ
                }
            }

            impl $crate::ast::Valuer for $ty {
                fn value(&self) -> &str {
                    &self.node.value
                }
            }
        )*
    };
}

pub(crate) use impl_node;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_a_node() {
        let t = Token::new(TokenType::KeyWord, 2, 3, 10, 6, "SELECT");
        assert_eq!((t.line(), t.col(), Positioner::offset(&t), t.length()), (2, 3, 10, 6));
        assert_eq!(t.node_type(), NodeType::Terminal(TokenType::KeyWord));
        assert!(Valuer::has_value(&t));
        let eof = Token::eof(1, 1, 0);
        assert!(!Valuer::has_value(&eof));
    }

    #[test]
    fn spanning_covers_both_tokens() {
        let a = Token::new(TokenType::RegularIdentifier, 1, 1, 0, 1, "a");
        let b = Token::new(TokenType::RegularIdentifier, 1, 5, 4, 3, "bcd");
        let info = NodeInfo::spanning(NodeType::IdentifierChain, &a, &b, "");
        assert_eq!((info.offset, info.length, info.end()), (0, 7, 7));
        assert!(!info.has_value());
    }
}
