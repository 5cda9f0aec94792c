use super::{impl_node, ColumnNameList, Identifier, IdentifierChain, NodeInfo, Subquery};
use super::ValueExpression;
use crate::token::Token;
use serde::Serialize;

/// `FROM … [WHERE …] [GROUP BY …] [HAVING …]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableExpression {
    /// Metadata.
    pub node: NodeInfo,
    /// Source tables.
    pub from: FromClause,
    /// Row filter.
    pub where_clause: Option<WhereClause>,
    /// Grouping.
    pub group_by: Option<GroupByClause>,
    /// Group filter.
    pub having: Option<HavingClause>,
}

/// `FROM reference, …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Table references.
    pub references: Vec<TableReference>,
}

/// Table primary or join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReference {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: TableReferenceKind,
}

/// Alternatives of [`TableReference`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableReferenceKind {
    /// Named table, derived table or parenthesized join.
    Primary(TablePrimary),
    /// Join of two references.
    Joined(Box<JoinedTable>),
}

/// Single table source with an optional correlation name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePrimary {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: TablePrimaryKind,
    /// `[AS] name [(columns)]`.
    pub correlation: Option<Correlation>,
}

/// Alternatives of [`TablePrimary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TablePrimaryKind {
    /// `schema.table`.
    Table(IdentifierChain),
    /// `(query)`.
    Derived(Subquery),
    /// `(joined table)`.
    Parenthesized(Box<TableReference>),
}

/// `[AS] name [(columns)]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Metadata.
    pub node: NodeInfo,
    /// The `AS` keyword, when written.
    pub as_token: Option<Token>,
    /// Correlation name.
    pub name: Identifier,
    /// Derived column names.
    pub columns: Option<ColumnNameList>,
}

/// Kind of a qualified join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinType {
    /// `[INNER] JOIN`.
    Inner,
    /// `LEFT [OUTER] JOIN`.
    Left,
    /// `RIGHT [OUTER] JOIN`.
    Right,
    /// `FULL [OUTER] JOIN`.
    Full,
}

/// How two references are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    /// `CROSS JOIN`.
    Cross,
    /// `[NATURAL] [type] JOIN`.
    Qualified {
        /// `NATURAL` was written.
        natural: bool,
        /// Join type.
        join_type: JoinType,
    },
}

/// `left join right [ON …|USING (…)]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedTable {
    /// Metadata.
    pub node: NodeInfo,
    /// Left operand.
    pub left: TableReference,
    /// Join kind.
    pub kind: JoinKind,
    /// Right operand.
    pub right: TablePrimary,
    /// Join condition; absent for cross and natural joins.
    pub specification: Option<JoinSpecification>,
}

/// `ON condition` or `USING (columns)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinSpecification {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: JoinSpecificationKind,
}

/// Alternatives of [`JoinSpecification`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JoinSpecificationKind {
    /// `ON condition`.
    On(ValueExpression),
    /// `USING (columns)`.
    Using(ColumnNameList),
}

/// `WHERE condition`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Search condition.
    pub condition: ValueExpression,
}

/// `GROUP BY [ALL|DISTINCT] element, …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupByClause {
    /// Metadata.
    pub node: NodeInfo,
    /// `ALL` or `DISTINCT`.
    pub quantifier: Option<Token>,
    /// Grouping elements.
    pub elements: Vec<GroupingElement>,
}

/// One grouping element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingElement {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: GroupingKind,
}

/// Alternatives of [`GroupingElement`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GroupingKind {
    /// Column reference.
    Column(IdentifierChain),
    /// `()`.
    Empty,
    /// `ROLLUP(columns)`.
    Rollup(Vec<IdentifierChain>),
    /// `CUBE(columns)`.
    Cube(Vec<IdentifierChain>),
}

/// `HAVING condition`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HavingClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Search condition.
    pub condition: ValueExpression,
}

impl_node!(
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
);
