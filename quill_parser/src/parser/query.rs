//! Query expressions: `WITH`, set operations, `SELECT`, ordering and limits.

use super::isolate::{Isolate, PResult};
use crate::ast::{
    AsClause, BodyKind, ColumnNameList, CorrespondingSpec, CycleClause, DerivedColumn,
    ExplicitTable, FetchFirstClause, FetchFirstQuantity, Identifier, IdentifierChain, NodeInfo,
    NodeType, NullOrdering, OrderByClause, PrimaryKind, QualifiedAsterisk, QueryExpression,
    QueryExpressionBody, QueryPrimary, QuerySpecification, QueryTerm, ResultOffsetClause,
    SearchClause, SearchOrCycleClause, SearchOrder, SelectList, SelectListKind, SelectSublist,
    SimpleTable, SimpleTableKind, SimpleValueKind, SimpleValueSpecification, SortSpecification,
    SublistKind, Subquery, TableValueConstructor, TermKind, WithClause, WithListElement,
};
use crate::token::{Keyword, Token, TokenType};

/// Token types that name something.
pub(super) const IDENTIFIER_TYPES: &[TokenType] = &[
    TokenType::RegularIdentifier,
    TokenType::DelimitedIdentifier,
    TokenType::UnicodeDelimitedIdentifier,
];

impl Isolate<'_> {
    pub(super) fn query_expression(&mut self) -> PResult<QueryExpression> {
        self.descend(|p| {
            let from = p.pos;
            let with_clause = p.with_clause()?;
            let body = if with_clause.is_some() {
                p.require("query expression body", |p| p.query_expression_body())?
            } else {
                p.query_expression_body()?
            };
            let Some(body) = body else { return Ok(None) };
            let order_by = p.order_by_clause()?;
            let offset = p.result_offset_clause()?;
            let fetch_first = p.fetch_first_clause()?;
            Ok(Some(QueryExpression {
                node: p.node(NodeType::QueryExpression, from),
                with_clause,
                body,
                order_by,
                offset,
                fetch_first,
            }))
        })
    }

    fn with_clause(&mut self) -> PResult<WithClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::With).is_none() {
            return Ok(None);
        }
        let recursive = self.accept_keyword(Keyword::Recursive);
        let elements = self.comma_list("with list element", |p| p.with_list_element())?;
        if elements.is_empty() {
            return Ok(None);
        }
        Ok(Some(WithClause { node: self.node(NodeType::WithClause, from), recursive, elements }))
    }

    fn with_list_element(&mut self) -> PResult<WithListElement> {
        let from = self.pos;
        let Some(name) = self.identifier() else { return Ok(None) };
        let columns = if self.peek_special('(') { self.column_name_list()? } else { None };
        if self.expect_keyword(Keyword::As).is_none() {
            return Ok(None);
        }
        let Some(subquery) = self.require("subquery", |p| p.subquery())? else {
            return Ok(None);
        };
        let search_or_cycle = self.search_or_cycle()?;
        Ok(Some(WithListElement {
            node: self.node(NodeType::WithListElement, from),
            name,
            columns,
            subquery,
            search_or_cycle,
        }))
    }

    /// `(query expression)`. Fails without the closing parenthesis so that
    /// speculative callers can back out.
    pub(super) fn subquery(&mut self) -> PResult<Subquery> {
        let from = self.pos;
        if self.accept_special('(').is_none() {
            return Ok(None);
        }
        let Some(query_expression) = self.require("query expression", |p| p.query_expression())?
        else {
            return Ok(None);
        };
        if self.expect_special(')').is_none() {
            return Ok(None);
        }
        Ok(Some(Subquery {
            node: self.node(NodeType::Subquery, from),
            query_expression: Box::new(query_expression),
        }))
    }

    /// `(a, b, …)`.
    pub(super) fn column_name_list(&mut self) -> PResult<ColumnNameList> {
        let from = self.pos;
        if self.accept_special('(').is_none() {
            return Ok(None);
        }
        let columns = self.comma_list("column name", |p| Ok(p.identifier()))?;
        if columns.is_empty() || self.expect_special(')').is_none() {
            return Ok(None);
        }
        Ok(Some(ColumnNameList { node: self.node(NodeType::ColumnNameList, from), columns }))
    }

    // `a, b, …` without parentheses.
    fn bare_column_name_list(&mut self) -> PResult<ColumnNameList> {
        let from = self.pos;
        let columns = self.comma_list("column name", |p| Ok(p.identifier()))?;
        if columns.is_empty() {
            return Ok(None);
        }
        Ok(Some(ColumnNameList { node: self.node(NodeType::ColumnNameList, from), columns }))
    }

    fn search_or_cycle(&mut self) -> PResult<SearchOrCycleClause> {
        let from = self.pos;
        let search = self.search_clause()?;
        let cycle = self.cycle_clause()?;
        if search.is_none() && cycle.is_none() {
            return Ok(None);
        }
        Ok(Some(SearchOrCycleClause {
            node: self.node(NodeType::SearchOrCycleClause, from),
            search,
            cycle,
        }))
    }

    fn search_clause(&mut self) -> PResult<SearchClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Search).is_none() {
            return Ok(None);
        }
        let order = if self.accept_keyword(Keyword::Depth).is_some() {
            SearchOrder::DepthFirst
        } else if self.accept_keyword(Keyword::Breadth).is_some() {
            SearchOrder::BreadthFirst
        } else {
            self.expected("DEPTH or BREADTH");
            return Ok(None);
        };
        if self.expect_keyword(Keyword::First).is_none() || self.expect_keyword(Keyword::By).is_none()
        {
            return Ok(None);
        }
        let Some(by) = self.bare_column_name_list()? else { return Ok(None) };
        if self.expect_keyword(Keyword::Set).is_none() {
            return Ok(None);
        }
        let Some(set) = self.expect_identifier("sequence column") else { return Ok(None) };
        Ok(Some(SearchClause { node: self.node(NodeType::SearchClause, from), order, by, set }))
    }

    fn cycle_clause(&mut self) -> PResult<CycleClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Cycle).is_none() {
            return Ok(None);
        }
        let Some(columns) = self.bare_column_name_list()? else { return Ok(None) };
        if self.expect_keyword(Keyword::Set).is_none() {
            return Ok(None);
        }
        let Some(mark_column) = self.expect_identifier("cycle mark column") else {
            return Ok(None);
        };
        if self.expect_keyword(Keyword::To).is_none() {
            return Ok(None);
        }
        let Some(mark_value) = self.require("cycle mark value", |p| p.value_expression())? else {
            return Ok(None);
        };
        if self.expect_keyword(Keyword::Default).is_none() {
            return Ok(None);
        }
        let Some(default_value) = self.require("non-cycle mark value", |p| p.value_expression())?
        else {
            return Ok(None);
        };
        if self.expect_keyword(Keyword::Using).is_none() {
            return Ok(None);
        }
        let Some(path_column) = self.expect_identifier("path column") else { return Ok(None) };
        Ok(Some(CycleClause {
            node: self.node(NodeType::CycleClause, from),
            columns,
            mark_column,
            mark_value,
            default_value,
            path_column,
        }))
    }

    fn query_expression_body(&mut self) -> PResult<QueryExpressionBody> {
        let from = self.pos;
        let Some(term) = self.query_term()? else { return Ok(None) };
        let mut body = QueryExpressionBody {
            node: self.node(NodeType::QueryExpressionBody, from),
            kind: BodyKind::Term(Box::new(term)),
        };
        while let Some(operator) = self.accept_one_of_keywords(&[Keyword::Union, Keyword::Except]) {
            let quantifier = self.accept_one_of_keywords(&[Keyword::All, Keyword::Distinct]);
            let corresponding = self.corresponding_spec()?;
            let Some(right) = self.require("query term", |p| p.query_term())? else {
                return Ok(None);
            };
            body = QueryExpressionBody {
                node: self.node(NodeType::QueryExpressionBody, from),
                kind: BodyKind::Compound {
                    left: Box::new(body),
                    operator,
                    quantifier,
                    corresponding,
                    right: Box::new(right),
                },
            };
        }
        Ok(Some(body))
    }

    fn query_term(&mut self) -> PResult<QueryTerm> {
        let from = self.pos;
        let Some(primary) = self.query_primary()? else { return Ok(None) };
        let mut term = QueryTerm {
            node: self.node(NodeType::QueryTerm, from),
            kind: TermKind::Primary(Box::new(primary)),
        };
        while let Some(operator) = self.accept_keyword(Keyword::Intersect) {
            let quantifier = self.accept_one_of_keywords(&[Keyword::All, Keyword::Distinct]);
            let corresponding = self.corresponding_spec()?;
            let Some(right) = self.require("query primary", |p| p.query_primary())? else {
                return Ok(None);
            };
            term = QueryTerm {
                node: self.node(NodeType::QueryTerm, from),
                kind: TermKind::Intersect {
                    left: Box::new(term),
                    operator,
                    quantifier,
                    corresponding,
                    right: Box::new(right),
                },
            };
        }
        Ok(Some(term))
    }

    fn query_primary(&mut self) -> PResult<QueryPrimary> {
        let from = self.pos;
        if self.peek_special('(') {
            return self.descend(|p| {
                p.next();
                let Some(body) =
                    p.require("query expression body", |p| p.query_expression_body())?
                else {
                    return Ok(None);
                };
                let order_by = p.order_by_clause()?;
                let offset = p.result_offset_clause()?;
                let fetch_first = p.fetch_first_clause()?;
                if p.expect_special(')').is_none() {
                    return Ok(None);
                }
                Ok(Some(QueryPrimary {
                    node: p.node(NodeType::QueryPrimary, from),
                    kind: PrimaryKind::Parenthesized {
                        body: Box::new(body),
                        order_by,
                        offset,
                        fetch_first,
                    },
                }))
            });
        }
        let Some(simple) = self.simple_table()? else { return Ok(None) };
        Ok(Some(QueryPrimary {
            node: self.node(NodeType::QueryPrimary, from),
            kind: PrimaryKind::Simple(simple),
        }))
    }

    fn simple_table(&mut self) -> PResult<SimpleTable> {
        let from = self.pos;
        let kind = if self.peek_keyword(Keyword::Select) {
            self.query_specification()?.map(SimpleTableKind::Specification)
        } else if self.peek_keyword(Keyword::Values) {
            self.table_value_constructor()?.map(SimpleTableKind::Values)
        } else if self.peek_keyword(Keyword::Table) {
            self.explicit_table().map(SimpleTableKind::Explicit)
        } else {
            None
        };
        Ok(kind.map(|kind| SimpleTable { node: self.node(NodeType::SimpleTable, from), kind }))
    }

    fn query_specification(&mut self) -> PResult<QuerySpecification> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Select).is_none() {
            return Ok(None);
        }
        let quantifier = self.accept_one_of_keywords(&[Keyword::All, Keyword::Distinct]);
        let Some(select_list) = self.require("select list", |p| p.select_list())? else {
            return Ok(None);
        };
        let table_expression = self.table_expression()?;
        Ok(Some(QuerySpecification {
            node: self.node(NodeType::QuerySpecification, from),
            quantifier,
            select_list,
            table_expression,
        }))
    }

    fn select_list(&mut self) -> PResult<SelectList> {
        let from = self.pos;
        if let Some(asterisk) = self.accept_special('*') {
            return Ok(Some(SelectList {
                node: self.node(NodeType::SelectList, from),
                kind: SelectListKind::Asterisk(asterisk),
            }));
        }
        let sublists = self.comma_list("select sublist", |p| p.select_sublist())?;
        if sublists.is_empty() {
            return Ok(None);
        }
        Ok(Some(SelectList {
            node: self.node(NodeType::SelectList, from),
            kind: SelectListKind::Sublists(sublists),
        }))
    }

    fn select_sublist(&mut self) -> PResult<SelectSublist> {
        let from = self.pos;
        if let Some(qualified) = self.attempt(|p| Ok(p.qualified_asterisk()))? {
            return Ok(Some(SelectSublist {
                node: self.node(NodeType::SelectSublist, from),
                kind: SublistKind::Qualified(qualified),
            }));
        }
        let Some(value) = self.value_expression()? else { return Ok(None) };
        let alias = self.as_clause();
        let derived = DerivedColumn { node: self.node(NodeType::DerivedColumn, from), value, alias };
        Ok(Some(SelectSublist {
            node: self.node(NodeType::SelectSublist, from),
            kind: SublistKind::Derived(derived),
        }))
    }

    fn qualified_asterisk(&mut self) -> Option<QualifiedAsterisk> {
        let from = self.pos;
        let chain = self.identifier_chain()?;
        self.accept_special('.')?;
        self.accept_special('*')?;
        Some(QualifiedAsterisk { node: self.node(NodeType::QualifiedAsterisk, from), chain })
    }

    fn as_clause(&mut self) -> Option<AsClause> {
        let from = self.pos;
        let as_token = self.accept_keyword(Keyword::As);
        let name = match as_token {
            Some(_) => self.expect_identifier("column alias")?,
            None => self.identifier()?,
        };
        Some(AsClause { node: self.node(NodeType::AsClause, from), as_token, name })
    }

    pub(super) fn identifier(&mut self) -> Option<Identifier> {
        let t = self.accept_one_of_types(IDENTIFIER_TYPES)?;
        Some(Identifier {
            node: NodeInfo::new(t.line, t.col, t.offset, t.length, NodeType::Identifier, t.value),
        })
    }

    pub(super) fn expect_identifier(&mut self, what: &str) -> Option<Identifier> {
        let identifier = self.identifier();
        if identifier.is_none() {
            self.expected(what);
        }
        identifier
    }

    /// `a.b.c`. A trailing `.` not followed by a name is left unread.
    pub(super) fn identifier_chain(&mut self) -> Option<IdentifierChain> {
        let from = self.pos;
        let mut parts = vec![self.identifier()?];
        while self.peek_special('.')
            && self.peek_nth(1).is_some_and(|t| IDENTIFIER_TYPES.contains(&t.typ))
        {
            self.next();
            parts.extend(self.identifier());
        }
        Some(IdentifierChain { node: self.node(NodeType::IdentifierChain, from), parts })
    }

    fn corresponding_spec(&mut self) -> PResult<CorrespondingSpec> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Corresponding).is_none() {
            return Ok(None);
        }
        let by = if self.accept_keyword(Keyword::By).is_some() {
            let Some(columns) = self.require("column name list", |p| p.column_name_list())? else {
                return Ok(None);
            };
            Some(columns)
        } else {
            None
        };
        Ok(Some(CorrespondingSpec { node: self.node(NodeType::CorrespondingSpec, from), by }))
    }

    fn table_value_constructor(&mut self) -> PResult<TableValueConstructor> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Values).is_none() {
            return Ok(None);
        }
        let rows = self.comma_list("row value expression", |p| p.value_expression())?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(TableValueConstructor {
            node: self.node(NodeType::TableValueConstructor, from),
            rows,
        }))
    }

    fn explicit_table(&mut self) -> Option<ExplicitTable> {
        let from = self.pos;
        self.accept_keyword(Keyword::Table)?;
        let Some(name) = self.identifier_chain() else {
            self.expected("table name");
            return None;
        };
        Some(ExplicitTable { node: self.node(NodeType::ExplicitTable, from), name })
    }

    pub(super) fn order_by_clause(&mut self) -> PResult<OrderByClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Order).is_none() {
            return Ok(None);
        }
        if self.expect_keyword(Keyword::By).is_none() {
            return Ok(None);
        }
        let keys = self.comma_list("sort specification", |p| p.sort_specification())?;
        if keys.is_empty() {
            return Ok(None);
        }
        Ok(Some(OrderByClause { node: self.node(NodeType::OrderByClause, from), keys }))
    }

    fn sort_specification(&mut self) -> PResult<SortSpecification> {
        let from = self.pos;
        let Some(key) = self.value_expression()? else { return Ok(None) };
        let ordering = self.accept_one_of_keywords(&[Keyword::Asc, Keyword::Desc]);
        let null_ordering = if self.accept_keyword(Keyword::Nulls).is_some() {
            if self.accept_keyword(Keyword::First).is_some() {
                Some(NullOrdering::First)
            } else if self.accept_keyword(Keyword::Last).is_some() {
                Some(NullOrdering::Last)
            } else {
                self.expected("FIRST or LAST");
                return Ok(None);
            }
        } else {
            None
        };
        Ok(Some(SortSpecification {
            node: self.node(NodeType::SortSpecification, from),
            key,
            ordering,
            null_ordering,
        }))
    }

    pub(super) fn result_offset_clause(&mut self) -> PResult<ResultOffsetClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Offset).is_none() {
            return Ok(None);
        }
        let Some(count) = self.require("offset row count", |p| Ok(p.simple_value_specification()))?
        else {
            return Ok(None);
        };
        let Some(rows) = self.expect_rows() else { return Ok(None) };
        Ok(Some(ResultOffsetClause { node: self.node(NodeType::ResultOffsetClause, from), count, rows }))
    }

    pub(super) fn fetch_first_clause(&mut self) -> PResult<FetchFirstClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Fetch).is_none() {
            return Ok(None);
        }
        let Some(first_or_next) = self.accept_one_of_keywords(&[Keyword::First, Keyword::Next])
        else {
            self.expected("FIRST or NEXT");
            return Ok(None);
        };
        let quantity = self.simple_value_specification().map(|count| {
            if self.accept_keyword(Keyword::Percent).is_some() {
                FetchFirstQuantity::Percentage(count)
            } else {
                FetchFirstQuantity::Count(count)
            }
        });
        let Some(rows) = self.expect_rows() else { return Ok(None) };
        let with_ties = if self.accept_keyword(Keyword::Only).is_some() {
            false
        } else if self.accept_keywords(&[Keyword::With, Keyword::Ties]).is_some() {
            true
        } else {
            self.expected("ONLY or WITH TIES");
            return Ok(None);
        };
        Ok(Some(FetchFirstClause {
            node: self.node(NodeType::FetchFirstClause, from),
            first_or_next,
            quantity,
            rows,
            with_ties,
        }))
    }

    fn expect_rows(&mut self) -> Option<Token> {
        let rows = self.accept_one_of_keywords(&[Keyword::Row, Keyword::Rows]);
        if rows.is_none() {
            self.expected("ROW or ROWS");
        }
        rows
    }

    fn simple_value_specification(&mut self) -> Option<SimpleValueSpecification> {
        let from = self.pos;
        let kind = if let Some(literal) = self.literal() {
            SimpleValueKind::Literal(literal)
        } else if let Some(parameter) = self.accept_special('?') {
            SimpleValueKind::Parameter(parameter)
        } else {
            SimpleValueKind::Name(self.identifier()?)
        };
        Some(SimpleValueSpecification { node: self.node(NodeType::SimpleValueSpecification, from), kind })
    }
}
