//! Value expressions and search conditions, lowest precedence first:
//! `OR`, `AND`, `NOT`, `IS`, predicates, `+ - ||`, `* /`, prefix signs.

use super::isolate::{Isolate, PResult};
use super::query::IDENTIFIER_TYPES;
use crate::ast::{
    BinaryOperator, CaseExpression, CastSpecification, DataType, ExpressionKind, IdentifierChain,
    InValues, Literal, LiteralKind, NodeType, RoutineArguments, RoutineInvocation, TruthValue,
    UnaryOperator, ValueExpression, WhenClause,
};
use crate::token::{Keyword, Token, TokenType};

/// Keywords that open a query expression.
const QUERY_START: &[Keyword] = &[Keyword::Select, Keyword::With, Keyword::Values, Keyword::Table];

/// String tokens emitted after `DATE`, `TIME`, `TIMESTAMP` or `INTERVAL`.
const TYPED_STRINGS: &[TokenType] = &[
    TokenType::DateString,
    TokenType::TimeString,
    TokenType::TimestampString,
    TokenType::IntervalString,
];

/// Single-word predefined types.
const SIMPLE_TYPES: &[Keyword] = &[
    Keyword::Varchar,
    Keyword::Integer,
    Keyword::Int,
    Keyword::Smallint,
    Keyword::Bigint,
    Keyword::Decimal,
    Keyword::Numeric,
    Keyword::Float,
    Keyword::Real,
    Keyword::Boolean,
    Keyword::Date,
    Keyword::Interval,
];

impl Isolate<'_> {
    /// Reports whether a query starts at the cursor, possibly behind `(`s.
    pub(super) fn query_ahead(&self) -> bool {
        let mut n = 0;
        while self.peek_nth(n).is_some_and(|t| t.is_special('(')) {
            n += 1;
        }
        self.peek_nth(n).is_some_and(|t| {
            t.typ == TokenType::KeyWord && QUERY_START.iter().any(|kw| t.is_keyword(*kw))
        })
    }

    pub(super) fn value_expression(&mut self) -> PResult<ValueExpression> {
        self.descend(|p| p.or_expression())
    }

    fn expression(&self, from: usize, kind: ExpressionKind) -> ValueExpression {
        ValueExpression { node: self.node(NodeType::ValueExpression, from), kind }
    }

    fn binary(
        &self,
        from: usize,
        left: ValueExpression,
        operator: BinaryOperator,
        token: Token,
        right: ValueExpression,
    ) -> ValueExpression {
        self.expression(
            from,
            ExpressionKind::Binary { left: Box::new(left), operator, token, right: Box::new(right) },
        )
    }

    fn or_expression(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(mut left) = self.and_expression()? else { return Ok(None) };
        while let Some(token) = self.accept_keyword(Keyword::Or) {
            let Some(right) = self.require("value expression", |p| p.and_expression())? else {
                return Ok(None);
            };
            left = self.binary(from, left, BinaryOperator::Or, token, right);
        }
        Ok(Some(left))
    }

    fn and_expression(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(mut left) = self.not_expression()? else { return Ok(None) };
        while let Some(token) = self.accept_keyword(Keyword::And) {
            let Some(right) = self.require("value expression", |p| p.not_expression())? else {
                return Ok(None);
            };
            left = self.binary(from, left, BinaryOperator::And, token, right);
        }
        Ok(Some(left))
    }

    fn not_expression(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(token) = self.accept_keyword(Keyword::Not) else { return self.boolean_test() };
        let Some(operand) =
            self.require("value expression", |p| p.descend(|p| p.not_expression()))?
        else {
            return Ok(None);
        };
        Ok(Some(self.expression(
            from,
            ExpressionKind::Unary { operator: UnaryOperator::Not, token, operand: Box::new(operand) },
        )))
    }

    fn boolean_test(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(mut operand) = self.predicate()? else { return Ok(None) };
        while self.accept_keyword(Keyword::Is).is_some() {
            let negated = self.accept_keyword(Keyword::Not).is_some();
            let kind = if self.accept_keyword(Keyword::Null).is_some() {
                ExpressionKind::NullTest { operand: Box::new(operand), negated }
            } else {
                let truth = if self.accept_keyword(Keyword::True).is_some() {
                    TruthValue::True
                } else if self.accept_keyword(Keyword::False).is_some() {
                    TruthValue::False
                } else if self.accept_keyword(Keyword::Unknown).is_some() {
                    TruthValue::Unknown
                } else {
                    self.expected("NULL, TRUE, FALSE or UNKNOWN");
                    return Ok(None);
                };
                ExpressionKind::BooleanTest { operand: Box::new(operand), negated, truth }
            };
            operand = self.expression(from, kind);
        }
        Ok(Some(operand))
    }

    fn predicate(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(operand) = self.additive()? else { return Ok(None) };
        if let Some((operator, token)) = self.comparison_operator() {
            let Some(right) = self.require("value expression", |p| p.additive())? else {
                return Ok(None);
            };
            return Ok(Some(self.binary(from, operand, operator, token, right)));
        }

        let pos = self.pos;
        let negated = self.accept_keyword(Keyword::Not).is_some();
        let kind = if self.accept_keyword(Keyword::Between).is_some() {
            let symmetry = self.accept_one_of_keywords(&[Keyword::Symmetric, Keyword::Asymmetric]);
            let Some(low) = self.require("lower bound", |p| p.additive())? else {
                return Ok(None);
            };
            if self.expect_keyword(Keyword::And).is_none() {
                return Ok(None);
            }
            let Some(high) = self.require("upper bound", |p| p.additive())? else {
                return Ok(None);
            };
            ExpressionKind::Between {
                operand: Box::new(operand),
                negated,
                symmetry,
                low: Box::new(low),
                high: Box::new(high),
            }
        } else if self.accept_keyword(Keyword::In).is_some() {
            let subquery = if self.query_ahead() { self.attempt(|p| p.subquery())? } else { None };
            let values = match subquery {
                Some(subquery) => InValues::Subquery(subquery),
                None => {
                    if self.expect_special('(').is_none() {
                        return Ok(None);
                    }
                    let list = self.comma_list("value expression", |p| p.value_expression())?;
                    if list.is_empty() || self.expect_special(')').is_none() {
                        return Ok(None);
                    }
                    InValues::List(list)
                }
            };
            ExpressionKind::In { operand: Box::new(operand), negated, values }
        } else if self.accept_keyword(Keyword::Like).is_some() {
            let Some(pattern) = self.require("pattern", |p| p.additive())? else {
                return Ok(None);
            };
            let escape = if self.accept_keyword(Keyword::Escape).is_some() {
                let Some(escape) = self.require("escape character", |p| p.additive())? else {
                    return Ok(None);
                };
                Some(Box::new(escape))
            } else {
                None
            };
            ExpressionKind::Like {
                operand: Box::new(operand),
                negated,
                pattern: Box::new(pattern),
                escape,
            }
        } else {
            self.pos = pos;
            return Ok(Some(operand));
        };
        Ok(Some(self.expression(from, kind)))
    }

    fn comparison_operator(&mut self) -> Option<(BinaryOperator, Token)> {
        let t = self.peek()?;
        let operator = match t.typ {
            TokenType::NotEqualsOperator => BinaryOperator::NotEquals,
            TokenType::GreaterThanOrEqualsOperator => BinaryOperator::GreaterThanOrEquals,
            TokenType::LessThanOrEqualsOperator => BinaryOperator::LessThanOrEquals,
            TokenType::SqlSpecialCharacter => match t.value.as_str() {
                "=" => BinaryOperator::Equals,
                "<" => BinaryOperator::LessThan,
                ">" => BinaryOperator::GreaterThan,
                _ => return None,
            },
            _ => return None,
        };
        self.next().map(|t| (operator, t))
    }

    fn additive(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(mut left) = self.multiplicative()? else { return Ok(None) };
        loop {
            let operator = match self.peek() {
                Some(t) if t.is_special('+') => BinaryOperator::Plus,
                Some(t) if t.is_special('-') => BinaryOperator::Minus,
                Some(t) if t.typ == TokenType::ConcatenationOperator => BinaryOperator::Concatenate,
                _ => return Ok(Some(left)),
            };
            let Some(token) = self.next() else { return Ok(Some(left)) };
            let Some(right) = self.require("value expression", |p| p.multiplicative())? else {
                return Ok(None);
            };
            left = self.binary(from, left, operator, token, right);
        }
    }

    fn multiplicative(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let Some(mut left) = self.unary()? else { return Ok(None) };
        loop {
            let operator = match self.peek() {
                Some(t) if t.is_special('*') => BinaryOperator::Multiply,
                Some(t) if t.is_special('/') => BinaryOperator::Divide,
                _ => return Ok(Some(left)),
            };
            let Some(token) = self.next() else { return Ok(Some(left)) };
            let Some(right) = self.require("value expression", |p| p.unary())? else {
                return Ok(None);
            };
            left = self.binary(from, left, operator, token, right);
        }
    }

    fn unary(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        let operator = if self.peek_special('+') {
            UnaryOperator::Plus
        } else if self.peek_special('-') {
            UnaryOperator::Minus
        } else {
            return self.primary();
        };
        let Some(token) = self.next() else { return Ok(None) };
        let Some(operand) = self.require("value expression", |p| p.descend(|p| p.unary()))? else {
            return Ok(None);
        };
        Ok(Some(self.expression(
            from,
            ExpressionKind::Unary { operator, token, operand: Box::new(operand) },
        )))
    }

    fn primary(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        if let Some(literal) = self.literal() {
            return Ok(Some(self.expression(from, ExpressionKind::Literal(literal))));
        }
        if let Some(parameter) = self.accept_special('?') {
            return Ok(Some(self.expression(from, ExpressionKind::Parameter(parameter))));
        }
        if self.peek_special('(') {
            return self.parenthesized();
        }
        if self.accept_keyword(Keyword::Exists).is_some() {
            let Some(subquery) = self.require("subquery", |p| p.subquery())? else {
                return Ok(None);
            };
            return Ok(Some(self.expression(from, ExpressionKind::Exists(subquery))));
        }
        if self.peek_keyword(Keyword::Case) {
            let Some(case) = self.case_expression()? else { return Ok(None) };
            return Ok(Some(self.expression(from, ExpressionKind::Case(Box::new(case)))));
        }
        if self.peek_keyword(Keyword::Cast) {
            let Some(cast) = self.cast_specification()? else { return Ok(None) };
            return Ok(Some(self.expression(from, ExpressionKind::Cast(Box::new(cast)))));
        }
        if self.peek_keyword(Keyword::Row) && self.peek_nth(1).is_some_and(|t| t.is_special('(')) {
            let row = self.next();
            self.next();
            let elements = self.comma_list("row element", |p| p.value_expression())?;
            if elements.is_empty() || self.expect_special(')').is_none() {
                return Ok(None);
            }
            return Ok(Some(self.expression(from, ExpressionKind::Row { row, elements })));
        }
        let Some(chain) = self.identifier_chain() else { return Ok(None) };
        if self.peek_special('(') {
            let Some(routine) = self.routine_invocation(from, chain)? else { return Ok(None) };
            return Ok(Some(self.expression(from, ExpressionKind::Routine(routine))));
        }
        Ok(Some(self.expression(from, ExpressionKind::Column(chain))))
    }

    /// Any literal, including typed and introduced strings and the
    /// `TRUE`, `FALSE`, `UNKNOWN` and `NULL` keywords.
    pub(super) fn literal(&mut self) -> Option<Literal> {
        let from = self.pos;
        if let Some(pair) = self.accept_token_sequence(&[
            TokenType::SqlLanguageIdentifier,
            TokenType::CharacterStringLiteral,
        ]) {
            let mut pair = pair.into_iter();
            let introducer = pair.next();
            let token = pair.next()?;
            return Some(self.make_literal(from, LiteralKind::Character, introducer, None, token));
        }

        let typed = self.peek().is_some_and(|t| t.typ == TokenType::KeyWord)
            && self.peek_nth(1).is_some_and(|t| TYPED_STRINGS.contains(&t.typ));
        let keyword = if typed { self.next() } else { None };
        let t = self.peek()?;
        let kind = if let Some(kind) = LiteralKind::of(t.typ) {
            kind
        } else if t.is_keyword(Keyword::True) || t.is_keyword(Keyword::False) {
            LiteralKind::Boolean
        } else if t.is_keyword(Keyword::Unknown) {
            LiteralKind::Unknown
        } else if t.is_keyword(Keyword::Null) {
            LiteralKind::Null
        } else {
            return None;
        };
        let token = self.next()?;
        Some(self.make_literal(from, kind, None, keyword, token))
    }

    fn make_literal(
        &self,
        from: usize,
        kind: LiteralKind,
        introducer: Option<Token>,
        keyword: Option<Token>,
        token: Token,
    ) -> Literal {
        Literal { node: self.node_valued(NodeType::Literal, from, token.value), kind, introducer, keyword }
    }

    /// `(…)` as a scalar subquery, a parenthesized expression or a row.
    fn parenthesized(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        if !self.query_ahead() {
            return self.parenthesized_expression();
        }
        if let Some(subquery) = self.attempt(|p| p.subquery())? {
            return Ok(Some(self.expression(from, ExpressionKind::ScalarSubquery(subquery))));
        }
        if let Some(expression) = self.attempt(|p| p.parenthesized_expression())? {
            return Ok(Some(expression));
        }
        let Some(subquery) = self.subquery()? else { return Ok(None) };
        Ok(Some(self.expression(from, ExpressionKind::ScalarSubquery(subquery))))
    }

    fn parenthesized_expression(&mut self) -> PResult<ValueExpression> {
        let from = self.pos;
        if self.accept_special('(').is_none() {
            return Ok(None);
        }
        let mut elements = self.comma_list("value expression", |p| p.value_expression())?;
        if self.expect_special(')').is_none() {
            return Ok(None);
        }
        let kind = if elements.len() > 1 {
            ExpressionKind::Row { row: None, elements }
        } else {
            match elements.pop() {
                Some(inner) => ExpressionKind::Parenthesized(Box::new(inner)),
                None => return Ok(None),
            }
        };
        Ok(Some(self.expression(from, kind)))
    }

    fn case_expression(&mut self) -> PResult<CaseExpression> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Case).is_none() {
            return Ok(None);
        }
        let operand = if self.peek_keyword(Keyword::When) {
            None
        } else {
            let Some(operand) = self.require("case operand", |p| p.value_expression())? else {
                return Ok(None);
            };
            Some(operand)
        };
        let mut whens = Vec::new();
        while self.peek_keyword(Keyword::When) {
            let when_from = self.pos;
            self.next();
            let Some(condition) = self.require("when operand", |p| p.value_expression())? else {
                return Ok(None);
            };
            if self.expect_keyword(Keyword::Then).is_none() {
                return Ok(None);
            }
            let Some(result) = self.require("result", |p| p.value_expression())? else {
                return Ok(None);
            };
            whens.push(WhenClause { node: self.node(NodeType::WhenClause, when_from), condition, result });
        }
        if whens.is_empty() {
            self.expected("WHEN");
            return Ok(None);
        }
        let else_result = if self.accept_keyword(Keyword::Else).is_some() {
            let Some(result) = self.require("result", |p| p.value_expression())? else {
                return Ok(None);
            };
            Some(result)
        } else {
            None
        };
        if self.expect_keyword(Keyword::End).is_none() {
            return Ok(None);
        }
        Ok(Some(CaseExpression { node: self.node(NodeType::CaseExpression, from), operand, whens, else_result }))
    }

    fn cast_specification(&mut self) -> PResult<CastSpecification> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Cast).is_none() || self.expect_special('(').is_none() {
            return Ok(None);
        }
        let Some(operand) = self.require("cast operand", |p| p.value_expression())? else {
            return Ok(None);
        };
        if self.expect_keyword(Keyword::As).is_none() {
            return Ok(None);
        }
        let Some(target) = self.require("data type", |p| p.data_type())? else {
            return Ok(None);
        };
        if self.expect_special(')').is_none() {
            return Ok(None);
        }
        Ok(Some(CastSpecification { node: self.node(NodeType::CastSpecification, from), operand, target }))
    }

    /// Predefined type, possibly of several words, or a user-defined type name.
    fn data_type(&mut self) -> PResult<DataType> {
        let from = self.pos;
        let mut name = Vec::new();
        let mut zoned = false;
        if let Some(double) = self.accept_keyword(Keyword::Double) {
            name.push(double);
            let Some(precision) = self.expect_keyword(Keyword::Precision) else { return Ok(None) };
            name.push(precision);
        } else if let Some(character) =
            self.accept_one_of_keywords(&[Keyword::Character, Keyword::Char])
        {
            name.push(character);
            name.extend(self.accept_keyword(Keyword::Varying));
        } else if let Some(time) = self.accept_one_of_keywords(&[Keyword::Time, Keyword::Timestamp]) {
            name.push(time);
            zoned = true;
        } else if let Some(simple) = self.accept_one_of_keywords(SIMPLE_TYPES) {
            name.push(simple);
        } else if let Some(user_defined) = self.accept_one_of_types(IDENTIFIER_TYPES) {
            name.push(user_defined);
        } else {
            return Ok(None);
        }

        let mut parameters = Vec::new();
        if self.accept_special('(').is_some() {
            parameters = self.comma_list("type parameter", |p| {
                Ok(p.accept_token(TokenType::UnsignedNumericLiteral))
            })?;
            if parameters.is_empty() || self.expect_special(')').is_none() {
                return Ok(None);
            }
        }
        if zoned {
            let zone = self
                .accept_keywords(&[Keyword::With, Keyword::Time, Keyword::Zone])
                .or_else(|| self.accept_keywords(&[Keyword::Without, Keyword::Time, Keyword::Zone]));
            name.extend(zone.into_iter().flatten());
        }

        let value = name
            .iter()
            .map(|t| match t.typ {
                TokenType::KeyWord | TokenType::RegularIdentifier => t.value.to_ascii_uppercase(),
                _ => t.value.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Some(DataType { node: self.node_valued(NodeType::DataType, from, value), name, parameters }))
    }

    fn routine_invocation(
        &mut self,
        from: usize,
        name: IdentifierChain,
    ) -> PResult<RoutineInvocation> {
        if self.accept_special('(').is_none() {
            return Ok(None);
        }
        let quantifier = self.accept_one_of_keywords(&[Keyword::All, Keyword::Distinct]);
        let arguments = if let Some(asterisk) = self.accept_special('*') {
            RoutineArguments::Asterisk(asterisk)
        } else if self.peek_special(')') {
            RoutineArguments::List(Vec::new())
        } else {
            RoutineArguments::List(self.comma_list("argument", |p| p.value_expression())?)
        };
        if self.expect_special(')').is_none() {
            return Ok(None);
        }
        Ok(Some(RoutineInvocation {
            node: self.node(NodeType::RoutineInvocation, from),
            name,
            quantifier,
            arguments,
        }))
    }
}
