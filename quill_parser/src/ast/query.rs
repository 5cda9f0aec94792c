use super::{impl_node, Identifier, IdentifierChain, NodeInfo, TableExpression, ValueExpression};
use super::{Literal, Subquery};
use crate::token::Token;
use serde::Serialize;

/// Root of every parsed statement. Its value is the whole source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Metadata.
    pub node: NodeInfo,
    /// `None` for input without any tokens.
    pub query_expression: Option<QueryExpression>,
}

/// `[WITH …] body [ORDER BY …] [OFFSET …] [FETCH …]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExpression {
    /// Metadata.
    pub node: NodeInfo,
    /// Common table expressions.
    pub with_clause: Option<WithClause>,
    /// Set operations over query terms.
    pub body: QueryExpressionBody,
    /// Result ordering.
    pub order_by: Option<OrderByClause>,
    /// Rows to skip.
    pub offset: Option<ResultOffsetClause>,
    /// Rows to return.
    pub fetch_first: Option<FetchFirstClause>,
}

/// `WITH [RECURSIVE] element, …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithClause {
    /// Metadata.
    pub node: NodeInfo,
    /// The `RECURSIVE` keyword, when present.
    pub recursive: Option<Token>,
    /// Named queries.
    pub elements: Vec<WithListElement>,
}

/// `name [(columns)] AS (query) [search or cycle clause]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithListElement {
    /// Metadata.
    pub node: NodeInfo,
    /// Query name.
    pub name: Identifier,
    /// Column names.
    pub columns: Option<ColumnNameList>,
    /// Defining query.
    pub subquery: Subquery,
    /// Recursive search or cycle detection.
    pub search_or_cycle: Option<SearchOrCycleClause>,
}

/// `(a, b, c)` or the unparenthesized list of a `SEARCH`/`CYCLE` clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNameList {
    /// Metadata.
    pub node: NodeInfo,
    /// Column names in order.
    pub columns: Vec<Identifier>,
}

/// Search clause, cycle clause, or both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOrCycleClause {
    /// Metadata.
    pub node: NodeInfo,
    /// `SEARCH …`.
    pub search: Option<SearchClause>,
    /// `CYCLE …`.
    pub cycle: Option<CycleClause>,
}

/// Traversal order of a recursive search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchOrder {
    /// `DEPTH FIRST`.
    DepthFirst,
    /// `BREADTH FIRST`.
    BreadthFirst,
}

/// `SEARCH DEPTH|BREADTH FIRST BY columns SET sequence_column`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Traversal order.
    pub order: SearchOrder,
    /// Ordering columns.
    pub by: ColumnNameList,
    /// Sequence column.
    pub set: Identifier,
}

/// `CYCLE columns SET mark TO value DEFAULT value USING path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Columns compared to detect a cycle.
    pub columns: ColumnNameList,
    /// Cycle mark column.
    pub mark_column: Identifier,
    /// Value marking a cycle.
    pub mark_value: ValueExpression,
    /// Value marking a non-cycle.
    pub default_value: ValueExpression,
    /// Path column.
    pub path_column: Identifier,
}

/// Left-associative `UNION`/`EXCEPT` chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExpressionBody {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: BodyKind,
}

/// Alternatives of [`QueryExpressionBody`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BodyKind {
    /// A single term.
    Term(Box<QueryTerm>),
    /// `left UNION|EXCEPT [ALL|DISTINCT] [CORRESPONDING …] right`.
    Compound {
        /// Left operand.
        left: Box<QueryExpressionBody>,
        /// `UNION` or `EXCEPT`.
        operator: Token,
        /// `ALL` or `DISTINCT`.
        quantifier: Option<Token>,
        /// Column correspondence.
        corresponding: Option<CorrespondingSpec>,
        /// Right operand.
        right: Box<QueryTerm>,
    },
}

/// Left-associative `INTERSECT` chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryTerm {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: TermKind,
}

/// Alternatives of [`QueryTerm`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TermKind {
    /// A single primary.
    Primary(Box<QueryPrimary>),
    /// `left INTERSECT [ALL|DISTINCT] [CORRESPONDING …] right`.
    Intersect {
        /// Left operand.
        left: Box<QueryTerm>,
        /// `INTERSECT`.
        operator: Token,
        /// `ALL` or `DISTINCT`.
        quantifier: Option<Token>,
        /// Column correspondence.
        corresponding: Option<CorrespondingSpec>,
        /// Right operand.
        right: Box<QueryPrimary>,
    },
}

/// Simple table or parenthesized query body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPrimary {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: PrimaryKind,
}

/// Alternatives of [`QueryPrimary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PrimaryKind {
    /// `SELECT …`, `VALUES …` or `TABLE …`.
    Simple(SimpleTable),
    /// `(body [ORDER BY …] [OFFSET …] [FETCH …])`.
    Parenthesized {
        /// Inner body.
        body: Box<QueryExpressionBody>,
        /// Ordering.
        order_by: Option<OrderByClause>,
        /// Offset.
        offset: Option<ResultOffsetClause>,
        /// Fetch.
        fetch_first: Option<FetchFirstClause>,
    },
}

/// Query specification, table value constructor or explicit table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleTable {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: SimpleTableKind,
}

/// Alternatives of [`SimpleTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimpleTableKind {
    /// `SELECT …`.
    Specification(QuerySpecification),
    /// `VALUES …`.
    Values(TableValueConstructor),
    /// `TABLE name`.
    Explicit(ExplicitTable),
}

/// `VALUES row, …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableValueConstructor {
    /// Metadata.
    pub node: NodeInfo,
    /// Row value expressions.
    pub rows: Vec<ValueExpression>,
}

/// `TABLE name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplicitTable {
    /// Metadata.
    pub node: NodeInfo,
    /// Table or query name.
    pub name: IdentifierChain,
}

/// `CORRESPONDING [BY (columns)]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrespondingSpec {
    /// Metadata.
    pub node: NodeInfo,
    /// Restriction to the named columns.
    pub by: Option<ColumnNameList>,
}

/// `SELECT [ALL|DISTINCT] select_list [table_expression]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpecification {
    /// Metadata.
    pub node: NodeInfo,
    /// `ALL` or `DISTINCT`.
    pub quantifier: Option<Token>,
    /// Projection.
    pub select_list: SelectList,
    /// `FROM …`; absent for table-less selects.
    pub table_expression: Option<TableExpression>,
}

/// Projection of a query specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectList {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: SelectListKind,
}

/// Alternatives of [`SelectList`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectListKind {
    /// `*`.
    Asterisk(Token),
    /// Comma-separated sublists.
    Sublists(Vec<SelectSublist>),
}

/// One element of a select list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectSublist {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: SublistKind,
}

/// Alternatives of [`SelectSublist`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SublistKind {
    /// `expr [AS alias]`.
    Derived(DerivedColumn),
    /// `chain.*`.
    Qualified(QualifiedAsterisk),
}

/// `expr [[AS] alias]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumn {
    /// Metadata.
    pub node: NodeInfo,
    /// Projected expression.
    pub value: ValueExpression,
    /// Column alias.
    pub alias: Option<AsClause>,
}

/// `[AS] name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsClause {
    /// Metadata.
    pub node: NodeInfo,
    /// The `AS` keyword, when written.
    pub as_token: Option<Token>,
    /// Alias.
    pub name: Identifier,
}

/// `a.b.*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedAsterisk {
    /// Metadata.
    pub node: NodeInfo,
    /// Qualifier.
    pub chain: IdentifierChain,
}

/// `ORDER BY key, …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Sort keys.
    pub keys: Vec<SortSpecification>,
}

/// Placement of nulls in a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NullOrdering {
    /// `NULLS FIRST`.
    First,
    /// `NULLS LAST`.
    Last,
}

/// `key [ASC|DESC] [NULLS FIRST|LAST]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpecification {
    /// Metadata.
    pub node: NodeInfo,
    /// Sort key expression.
    pub key: ValueExpression,
    /// `ASC` or `DESC`.
    pub ordering: Option<Token>,
    /// Null placement.
    pub null_ordering: Option<NullOrdering>,
}

/// `OFFSET n ROW|ROWS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultOffsetClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Row count.
    pub count: SimpleValueSpecification,
    /// `ROW` or `ROWS`.
    pub rows: Token,
}

/// Row limit of a fetch clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchFirstQuantity {
    /// `n`.
    Count(SimpleValueSpecification),
    /// `n PERCENT`.
    Percentage(SimpleValueSpecification),
}

/// `FETCH FIRST|NEXT [quantity] ROW|ROWS ONLY|WITH TIES`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFirstClause {
    /// Metadata.
    pub node: NodeInfo,
    /// `FIRST` or `NEXT`.
    pub first_or_next: Token,
    /// Row limit; one row when absent.
    pub quantity: Option<FetchFirstQuantity>,
    /// `ROW` or `ROWS`.
    pub rows: Token,
    /// `WITH TIES` rather than `ONLY`.
    pub with_ties: bool,
}

/// Literal, parameter or name used as a row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleValueSpecification {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: SimpleValueKind,
}

/// Alternatives of [`SimpleValueSpecification`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimpleValueKind {
    /// Literal.
    Literal(Literal),
    /// `?`.
    Parameter(Token),
    /// Host or SQL variable name.
    Name(Identifier),
}

impl_node!(
    Query,
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
    OrderByClause,
    SortSpecification,
    ResultOffsetClause,
    FetchFirstClause,
    SimpleValueSpecification,
);
