use super::{impl_node, NodeInfo, QueryExpression};
use crate::token::{Token, TokenType};
use serde::Serialize;

/// Regular or delimited identifier. The value is the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    /// Metadata.
    pub node: NodeInfo,
}

impl Identifier {
    /// Identifier text with delimiters removed and doubled quotes collapsed.
    pub fn name(&self) -> String {
        let raw = self.node.value.as_str();
        let body = raw
            .strip_prefix("U&")
            .or_else(|| raw.strip_prefix("u&"))
            .unwrap_or(raw);
        match body.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Some(inner) => inner.replace("\"\"", "\""),
            None => raw.to_owned(),
        }
    }
}

/// `a.b.c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierChain {
    /// Metadata.
    pub node: NodeInfo,
    /// Parts in source order.
    pub parts: Vec<Identifier>,
}

/// `(query)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subquery {
    /// Metadata.
    pub node: NodeInfo,
    /// Inner query.
    pub query_expression: Box<QueryExpression>,
}

/// Any value expression, search condition or row value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueExpression {
    /// Metadata.
    pub node: NodeInfo,
    /// Alternative.
    pub kind: ExpressionKind,
}

/// Infix operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEquals,
    GreaterThanOrEquals,
    Plus,
    Minus,
    Concatenate,
    Multiply,
    Divide,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum UnaryOperator {
    Not,
    Plus,
    Minus,
}

/// Right-hand side of `IS [NOT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InValues {
    /// `(a, b, …)`.
    List(Vec<ValueExpression>),
    /// `(query)`.
    Subquery(Subquery),
}

/// Alternatives of [`ValueExpression`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    /// `left op right`.
    Binary {
        /// Left operand.
        left: Box<ValueExpression>,
        /// Operator.
        operator: BinaryOperator,
        /// Operator token.
        token: Token,
        /// Right operand.
        right: Box<ValueExpression>,
    },
    /// `op operand`.
    Unary {
        /// Operator.
        operator: UnaryOperator,
        /// Operator token.
        token: Token,
        /// Operand.
        operand: Box<ValueExpression>,
    },
    /// `operand IS [NOT] TRUE|FALSE|UNKNOWN`.
    BooleanTest {
        /// Operand.
        operand: Box<ValueExpression>,
        /// `NOT` was written.
        negated: bool,
        /// Tested truth value.
        truth: TruthValue,
    },
    /// `operand IS [NOT] NULL`.
    NullTest {
        /// Operand.
        operand: Box<ValueExpression>,
        /// `NOT` was written.
        negated: bool,
    },
    /// `operand [NOT] BETWEEN [SYMMETRIC|ASYMMETRIC] low AND high`.
    Between {
        /// Operand.
        operand: Box<ValueExpression>,
        /// `NOT` was written.
        negated: bool,
        /// `SYMMETRIC` or `ASYMMETRIC`.
        symmetry: Option<Token>,
        /// Lower bound.
        low: Box<ValueExpression>,
        /// Upper bound.
        high: Box<ValueExpression>,
    },
    /// `operand [NOT] IN (…)`.
    In {
        /// Operand.
        operand: Box<ValueExpression>,
        /// `NOT` was written.
        negated: bool,
        /// Candidate values.
        values: InValues,
    },
    /// `operand [NOT] LIKE pattern [ESCAPE escape]`.
    Like {
        /// Operand.
        operand: Box<ValueExpression>,
        /// `NOT` was written.
        negated: bool,
        /// Pattern.
        pattern: Box<ValueExpression>,
        /// Escape character.
        escape: Option<Box<ValueExpression>>,
    },
    /// `EXISTS (query)`.
    Exists(Subquery),
    /// Literal.
    Literal(Literal),
    /// Column reference.
    Column(IdentifierChain),
    /// `?`.
    Parameter(Token),
    /// `(expr)`.
    Parenthesized(Box<ValueExpression>),
    /// `(a, b)` or `ROW(a, …)`.
    Row {
        /// The `ROW` keyword, when written.
        row: Option<Token>,
        /// Row elements.
        elements: Vec<ValueExpression>,
    },
    /// `(query)` used as a value.
    ScalarSubquery(Subquery),
    /// `CASE … END`.
    Case(Box<CaseExpression>),
    /// `CAST(expr AS type)`.
    Cast(Box<CastSpecification>),
    /// `name(args)`.
    Routine(RoutineInvocation),
}

/// Kind of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum LiteralKind {
    Numeric,
    Character,
    National,
    Binary,
    Unicode,
    Date,
    Time,
    Timestamp,
    Interval,
    Boolean,
    Unknown,
    Null,
}

impl LiteralKind {
    /// Literal kind of a token, if it is a literal token.
    pub fn of(typ: TokenType) -> Option<Self> {
        Some(match typ {
            TokenType::UnsignedNumericLiteral => LiteralKind::Numeric,
            TokenType::CharacterStringLiteral => LiteralKind::Character,
            TokenType::NationalCharacterStringLiteral => LiteralKind::National,
            TokenType::BinaryStringLiteral => LiteralKind::Binary,
            TokenType::UnicodeCharacterStringLiteral => LiteralKind::Unicode,
            TokenType::DateString => LiteralKind::Date,
            TokenType::TimeString => LiteralKind::Time,
            TokenType::TimestampString => LiteralKind::Timestamp,
            TokenType::IntervalString => LiteralKind::Interval,
            _ => return None,
        })
    }
}

/// Literal value. The value is the literal's source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    /// Metadata.
    pub node: NodeInfo,
    /// Kind.
    pub kind: LiteralKind,
    /// `_charset` introducer of a character string.
    pub introducer: Option<Token>,
    /// `DATE`, `TIME`, `TIMESTAMP` or `INTERVAL` before a typed string.
    pub keyword: Option<Token>,
}

/// Simple (`CASE x WHEN 1 …`) or searched (`CASE WHEN x = 1 …`) case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseExpression {
    /// Metadata.
    pub node: NodeInfo,
    /// Operand of a simple case.
    pub operand: Option<ValueExpression>,
    /// `WHEN … THEN …` arms.
    pub whens: Vec<WhenClause>,
    /// `ELSE` result.
    pub else_result: Option<ValueExpression>,
}

/// `WHEN condition THEN result`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhenClause {
    /// Metadata.
    pub node: NodeInfo,
    /// Condition or comparand.
    pub condition: ValueExpression,
    /// Result.
    pub result: ValueExpression,
}

/// `CAST(operand AS target)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastSpecification {
    /// Metadata.
    pub node: NodeInfo,
    /// Converted value.
    pub operand: ValueExpression,
    /// Target type.
    pub target: DataType,
}

/// Predefined or user-defined type name with optional parameters.
///
/// The value is the normalized type name, e.g. `DOUBLE PRECISION`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataType {
    /// Metadata.
    pub node: NodeInfo,
    /// Name tokens.
    pub name: Vec<Token>,
    /// Length, precision or scale.
    pub parameters: Vec<Token>,
}

/// Arguments of a routine invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RoutineArguments {
    /// `COUNT(*)`.
    Asterisk(Token),
    /// `(a, b, …)`.
    List(Vec<ValueExpression>),
}

/// `name([ALL|DISTINCT] args)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineInvocation {
    /// Metadata.
    pub node: NodeInfo,
    /// Routine name.
    pub name: IdentifierChain,
    /// `ALL` or `DISTINCT` of an aggregate.
    pub quantifier: Option<Token>,
    /// Arguments.
    pub arguments: RoutineArguments,
}

impl_node!(
    Identifier,
    IdentifierChain,
    Subquery,
    ValueExpression,
    Literal,
    CaseExpression,
    WhenClause,
    CastSpecification,
    DataType,
    RoutineInvocation,
);
