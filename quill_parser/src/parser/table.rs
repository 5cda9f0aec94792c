//! `FROM`, joins, `WHERE`, `GROUP BY` and `HAVING`.

use super::isolate::{Isolate, PResult};
use crate::ast::{
    Correlation, FromClause, GroupByClause, GroupingElement, GroupingKind, HavingClause,
    JoinKind, JoinSpecification, JoinSpecificationKind, JoinType, JoinedTable, NodeType,
    TableExpression, TablePrimary, TablePrimaryKind, TableReference, TableReferenceKind,
    WhereClause,
};
use crate::token::Keyword;

impl Isolate<'_> {
    pub(super) fn table_expression(&mut self) -> PResult<TableExpression> {
        let from = self.pos;
        let Some(from_clause) = self.from_clause()? else { return Ok(None) };
        let where_clause = self.where_clause()?;
        let group_by = self.group_by_clause()?;
        let having = self.having_clause()?;
        Ok(Some(TableExpression {
            node: self.node(NodeType::TableExpression, from),
            from: from_clause,
            where_clause,
            group_by,
            having,
        }))
    }

    fn from_clause(&mut self) -> PResult<FromClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::From).is_none() {
            return Ok(None);
        }
        let references = self.comma_list("table reference", |p| p.table_reference())?;
        Ok(Some(FromClause { node: self.node(NodeType::FromClause, from), references }))
    }

    /// Table primary followed by any number of joins, associating left.
    fn table_reference(&mut self) -> PResult<TableReference> {
        self.descend(|p| {
            let from = p.pos;
            let Some(primary) = p.table_primary()? else { return Ok(None) };
            let mut reference = TableReference {
                node: p.node(NodeType::TableReference, from),
                kind: TableReferenceKind::Primary(primary),
            };
            while let Some(kind) = p.join_kind() {
                let Some(right) = p.require("table primary", |p| p.table_primary())? else {
                    return Ok(None);
                };
                let specification = match kind {
                    JoinKind::Qualified { natural: false, .. } => {
                        let Some(spec) = p.join_specification()? else {
                            p.expected("ON or USING");
                            return Ok(None);
                        };
                        Some(spec)
                    }
                    _ => None,
                };
                let joined = JoinedTable {
                    node: p.node(NodeType::JoinedTable, from),
                    left: reference,
                    kind,
                    right,
                    specification,
                };
                reference = TableReference {
                    node: p.node(NodeType::TableReference, from),
                    kind: TableReferenceKind::Joined(Box::new(joined)),
                };
            }
            Ok(Some(reference))
        })
    }

    fn join_kind(&mut self) -> Option<JoinKind> {
        if self.accept_keywords(&[Keyword::Cross, Keyword::Join]).is_some() {
            return Some(JoinKind::Cross);
        }
        let pos = self.pos;
        let natural = self.accept_keyword(Keyword::Natural).is_some();
        let join_type = if self.accept_keyword(Keyword::Inner).is_some() {
            JoinType::Inner
        } else if let Some(outer) =
            self.accept_one_of_keywords(&[Keyword::Left, Keyword::Right, Keyword::Full])
        {
            self.accept_keyword(Keyword::Outer);
            if outer.is_keyword(Keyword::Left) {
                JoinType::Left
            } else if outer.is_keyword(Keyword::Right) {
                JoinType::Right
            } else {
                JoinType::Full
            }
        } else {
            JoinType::Inner
        };
        if self.accept_keyword(Keyword::Join).is_none() {
            self.pos = pos;
            return None;
        }
        Some(JoinKind::Qualified { natural, join_type })
    }

    fn join_specification(&mut self) -> PResult<JoinSpecification> {
        let from = self.pos;
        let kind = if self.accept_keyword(Keyword::On).is_some() {
            let Some(condition) = self.require("join condition", |p| p.value_expression())? else {
                return Ok(None);
            };
            JoinSpecificationKind::On(condition)
        } else if self.accept_keyword(Keyword::Using).is_some() {
            let Some(columns) = self.require("column name list", |p| p.column_name_list())? else {
                return Ok(None);
            };
            JoinSpecificationKind::Using(columns)
        } else {
            return Ok(None);
        };
        Ok(Some(JoinSpecification { node: self.node(NodeType::JoinSpecification, from), kind }))
    }

    fn table_primary(&mut self) -> PResult<TablePrimary> {
        let from = self.pos;
        let kind = if self.peek_special('(') {
            if self.query_ahead() {
                let Some(subquery) = self.require("subquery", |p| p.subquery())? else {
                    return Ok(None);
                };
                TablePrimaryKind::Derived(subquery)
            } else {
                self.next();
                let Some(inner) = self.require("joined table", |p| p.table_reference())? else {
                    return Ok(None);
                };
                if self.expect_special(')').is_none() {
                    return Ok(None);
                }
                TablePrimaryKind::Parenthesized(Box::new(inner))
            }
        } else if let Some(chain) = self.identifier_chain() {
            TablePrimaryKind::Table(chain)
        } else {
            return Ok(None);
        };
        let correlation = self.correlation()?;
        Ok(Some(TablePrimary { node: self.node(NodeType::TablePrimary, from), kind, correlation }))
    }

    fn correlation(&mut self) -> PResult<Correlation> {
        let from = self.pos;
        let as_token = self.accept_keyword(Keyword::As);
        let name = match as_token {
            Some(_) => self.expect_identifier("correlation name"),
            None => self.identifier(),
        };
        let Some(name) = name else { return Ok(None) };
        let columns = if self.peek_special('(') { self.column_name_list()? } else { None };
        Ok(Some(Correlation { node: self.node(NodeType::Correlation, from), as_token, name, columns }))
    }

    fn where_clause(&mut self) -> PResult<WhereClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Where).is_none() {
            return Ok(None);
        }
        let Some(condition) = self.require("search condition", |p| p.value_expression())? else {
            return Ok(None);
        };
        Ok(Some(WhereClause { node: self.node(NodeType::WhereClause, from), condition }))
    }

    fn group_by_clause(&mut self) -> PResult<GroupByClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Group).is_none() {
            return Ok(None);
        }
        if self.expect_keyword(Keyword::By).is_none() {
            return Ok(None);
        }
        let quantifier = self.accept_one_of_keywords(&[Keyword::All, Keyword::Distinct]);
        let elements = self.comma_list("grouping element", |p| p.grouping_element())?;
        if elements.is_empty() {
            return Ok(None);
        }
        Ok(Some(GroupByClause { node: self.node(NodeType::GroupByClause, from), quantifier, elements }))
    }

    fn grouping_element(&mut self) -> PResult<GroupingElement> {
        let from = self.pos;
        let kind = if self.accept_special('(').is_some() {
            if self.expect_special(')').is_none() {
                return Ok(None);
            }
            GroupingKind::Empty
        } else if let Some(set) = self.accept_one_of_keywords(&[Keyword::Rollup, Keyword::Cube]) {
            if self.expect_special('(').is_none() {
                return Ok(None);
            }
            let columns = self.comma_list("column reference", |p| Ok(p.identifier_chain()))?;
            if columns.is_empty() || self.expect_special(')').is_none() {
                return Ok(None);
            }
            if set.is_keyword(Keyword::Rollup) {
                GroupingKind::Rollup(columns)
            } else {
                GroupingKind::Cube(columns)
            }
        } else if let Some(chain) = self.identifier_chain() {
            GroupingKind::Column(chain)
        } else {
            return Ok(None);
        };
        Ok(Some(GroupingElement { node: self.node(NodeType::GroupingElement, from), kind }))
    }

    fn having_clause(&mut self) -> PResult<HavingClause> {
        let from = self.pos;
        if self.accept_keyword(Keyword::Having).is_none() {
            return Ok(None);
        }
        let Some(condition) = self.require("search condition", |p| p.value_expression())? else {
            return Ok(None);
        };
        Ok(Some(HavingClause { node: self.node(NodeType::HavingClause, from), condition }))
    }
}
