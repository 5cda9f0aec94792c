use super::isolate::Isolate;
use super::*;
use crate::ast::*;
use crate::scanner::{scan_all, ScanFault};
use crate::token::{Keyword, Stream, TokenType};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn parse_ok(sql: &str) -> QueryExpression {
    match parse(sql) {
        Ok(query) => query.query_expression.expect("query expression"),
        Err(e) => panic!("{sql}: {e}"),
    }
}

fn term(body: &QueryExpressionBody) -> &QueryTerm {
    match &body.kind {
        BodyKind::Term(term) => term,
        other => panic!("expected a single term, got {other:?}"),
    }
}

fn simple(body: &QueryExpressionBody) -> &SimpleTableKind {
    match &term(body).kind {
        TermKind::Primary(primary) => match &primary.kind {
            PrimaryKind::Simple(simple) => &simple.kind,
            other => panic!("expected a simple table, got {other:?}"),
        },
        other => panic!("expected a primary, got {other:?}"),
    }
}

fn spec(qe: &QueryExpression) -> &QuerySpecification {
    match simple(&qe.body) {
        SimpleTableKind::Specification(spec) => spec,
        other => panic!("expected SELECT, got {other:?}"),
    }
}

fn columns(spec: &QuerySpecification) -> Vec<&ValueExpression> {
    match &spec.select_list.kind {
        SelectListKind::Sublists(sublists) => sublists
            .iter()
            .map(|s| match &s.kind {
                SublistKind::Derived(d) => &d.value,
                other => panic!("expected a derived column, got {other:?}"),
            })
            .collect(),
        other => panic!("expected sublists, got {other:?}"),
    }
}

fn table(qe: &QueryExpression) -> &TableExpression {
    spec(qe).table_expression.as_ref().expect("FROM")
}

fn column_name(e: &ValueExpression) -> String {
    match &e.kind {
        ExpressionKind::Column(chain) => {
            chain.parts.iter().map(Identifier::name).collect::<Vec<_>>().join(".")
        }
        other => panic!("expected a column, got {other:?}"),
    }
}

fn operator(e: &ValueExpression) -> BinaryOperator {
    match &e.kind {
        ExpressionKind::Binary { operator, .. } => *operator,
        other => panic!("expected a binary expression, got {other:?}"),
    }
}

fn operands(e: &ValueExpression) -> (&ValueExpression, &ValueExpression) {
    match &e.kind {
        ExpressionKind::Binary { left, right, .. } => (left, right),
        other => panic!("expected a binary expression, got {other:?}"),
    }
}

fn isolate<'a>(sql: &'a str, config: &'a ParserConfig) -> Isolate<'a> {
    let tokens = scan_all(sql).0.into_iter().filter(|t| t.typ != TokenType::Eof).collect();
    Isolate::with_tokens(sql, config, tokens)
}

#[test]
fn parse_simple_select() {
    let sql = "SELECT a, b FROM t";
    let query = parse(sql).unwrap();
    assert_eq!((query.offset(), query.length(), query.value()), (0, sql.len(), sql));
    assert_eq!(query.node_type(), NodeType::Root);

    let qe = query.query_expression.unwrap();
    assert_eq!((qe.offset(), qe.length()), (0, sql.len()));
    let select = spec(&qe);
    assert_eq!((select.select_list.offset(), select.select_list.length()), (7, 4));
    let names: Vec<_> = columns(select).into_iter().map(column_name).collect();
    assert_eq!(names, ["a", "b"]);

    let from = &table(&qe).from;
    assert_eq!((from.line(), from.col(), from.offset(), from.length()), (1, 13, 12, 6));
    assert_eq!(from.references.len(), 1);
}

#[test]
fn trailing_semicolon_is_accepted() {
    assert!(parse("SELECT 1;").is_ok());
}

#[test]
fn asterisk_qualified_asterisk_and_aliases() {
    let qe = parse_ok("SELECT *");
    assert!(matches!(spec(&qe).select_list.kind, SelectListKind::Asterisk(_)));
    assert!(spec(&qe).table_expression.is_none());

    let qe = parse_ok("SELECT t.*, x.y AS z, w v FROM t");
    let SelectListKind::Sublists(sublists) = &spec(&qe).select_list.kind else {
        panic!("expected sublists")
    };
    assert_eq!(sublists.len(), 3);
    match &sublists[0].kind {
        SublistKind::Qualified(q) => assert_eq!(q.chain.parts[0].name(), "t"),
        other => panic!("{other:?}"),
    }
    match &sublists[1].kind {
        SublistKind::Derived(d) => {
            assert_eq!(column_name(&d.value), "x.y");
            let alias = d.alias.as_ref().unwrap();
            assert!(alias.as_token.is_some());
            assert_eq!(alias.name.name(), "z");
        }
        other => panic!("{other:?}"),
    }
    match &sublists[2].kind {
        SublistKind::Derived(d) => {
            let alias = d.alias.as_ref().unwrap();
            assert!(alias.as_token.is_none());
            assert_eq!(alias.name.name(), "v");
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn joins_associate_left() {
    let qe = parse_ok(
        "SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.id CROSS JOIN c NATURAL JOIN d",
    );
    let reference = &table(&qe).from.references[0];
    let TableReferenceKind::Joined(natural) = &reference.kind else { panic!("expected a join") };
    assert_eq!(natural.kind, JoinKind::Qualified { natural: true, join_type: JoinType::Inner });
    assert!(natural.specification.is_none());

    let TableReferenceKind::Joined(cross) = &natural.left.kind else { panic!("expected a join") };
    assert_eq!(cross.kind, JoinKind::Cross);

    let TableReferenceKind::Joined(left) = &cross.left.kind else { panic!("expected a join") };
    assert_eq!(left.kind, JoinKind::Qualified { natural: false, join_type: JoinType::Left });
    match &left.specification.as_ref().unwrap().kind {
        JoinSpecificationKind::On(condition) => assert_eq!(operator(condition), BinaryOperator::Equals),
        other => panic!("{other:?}"),
    }
    assert!(matches!(left.left.kind, TableReferenceKind::Primary(_)));
}

#[test]
fn derived_and_parenthesized_tables() {
    let qe = parse_ok(
        "SELECT x.a FROM (SELECT a FROM t) AS x (a), (u JOIN v USING (k)) WHERE x.a IN (SELECT k FROM u)",
    );
    let te = table(&qe);
    assert_eq!(te.from.references.len(), 2);

    let TableReferenceKind::Primary(derived) = &te.from.references[0].kind else {
        panic!("expected a primary")
    };
    assert!(matches!(derived.kind, TablePrimaryKind::Derived(_)));
    let correlation = derived.correlation.as_ref().unwrap();
    assert_eq!(correlation.name.name(), "x");
    assert_eq!(correlation.columns.as_ref().unwrap().columns.len(), 1);

    let TableReferenceKind::Primary(nested) = &te.from.references[1].kind else {
        panic!("expected a primary")
    };
    let TablePrimaryKind::Parenthesized(inner) = &nested.kind else { panic!("expected parentheses") };
    let TableReferenceKind::Joined(join) = &inner.kind else { panic!("expected a join") };
    assert!(matches!(
        join.specification.as_ref().unwrap().kind,
        JoinSpecificationKind::Using(_)
    ));

    let condition = &te.where_clause.as_ref().unwrap().condition;
    assert!(matches!(
        condition.kind,
        ExpressionKind::In { negated: false, values: InValues::Subquery(_), .. }
    ));
}

#[test]
fn table_expression_clauses() {
    let qe = parse_ok(
        "SELECT a, count(*) FROM t \
         WHERE a > 1 AND NOT b IS NULL \
         GROUP BY a, ROLLUP(b, c), () \
         HAVING count(*) > 2 \
         ORDER BY a DESC NULLS LAST, 2 \
         OFFSET 10 ROWS FETCH FIRST 5 ROWS ONLY",
    );
    let cols = columns(spec(&qe));
    match &cols[1].kind {
        ExpressionKind::Routine(routine) => {
            assert_eq!(routine.name.parts[0].name(), "count");
            assert!(matches!(routine.arguments, RoutineArguments::Asterisk(_)));
        }
        other => panic!("{other:?}"),
    }

    let te = table(&qe);
    let condition = &te.where_clause.as_ref().unwrap().condition;
    assert_eq!(operator(condition), BinaryOperator::And);
    let (left, right) = operands(condition);
    assert_eq!(operator(left), BinaryOperator::GreaterThan);
    match &right.kind {
        ExpressionKind::Unary { operator: UnaryOperator::Not, operand, .. } => {
            assert!(matches!(operand.kind, ExpressionKind::NullTest { negated: false, .. }));
        }
        other => panic!("{other:?}"),
    }

    let group_by = te.group_by.as_ref().unwrap();
    assert!(group_by.quantifier.is_none());
    let kinds: Vec<_> = group_by.elements.iter().map(|e| &e.kind).collect();
    assert!(matches!(kinds[0], GroupingKind::Column(_)));
    assert!(matches!(kinds[1], GroupingKind::Rollup(cols) if cols.len() == 2));
    assert!(matches!(kinds[2], GroupingKind::Empty));
    assert!(te.having.is_some());

    let order_by = qe.order_by.as_ref().unwrap();
    assert_eq!(order_by.keys.len(), 2);
    assert!(order_by.keys[0].ordering.as_ref().unwrap().is_keyword(Keyword::Desc));
    assert_eq!(order_by.keys[0].null_ordering, Some(NullOrdering::Last));
    assert!(order_by.keys[1].ordering.is_none());

    let offset = qe.offset.as_ref().unwrap();
    assert_eq!(offset.count.value(), "");
    assert!(matches!(&offset.count.kind, SimpleValueKind::Literal(l) if l.value() == "10"));

    let fetch = qe.fetch_first.as_ref().unwrap();
    assert!(fetch.first_or_next.is_keyword(Keyword::First));
    assert!(matches!(fetch.quantity, Some(FetchFirstQuantity::Count(_))));
    assert!(!fetch.with_ties);
}

#[test]
fn fetch_variants() {
    let qe = parse_ok("SELECT a FROM t ORDER BY a FETCH NEXT ROW WITH TIES");
    let fetch = qe.fetch_first.unwrap();
    assert!(fetch.quantity.is_none());
    assert!(fetch.with_ties);

    let qe = parse_ok("SELECT a FROM t FETCH FIRST 10 PERCENT ROWS ONLY");
    assert!(matches!(qe.fetch_first.unwrap().quantity, Some(FetchFirstQuantity::Percentage(_))));
}

#[test]
fn recursive_with_search_and_cycle() {
    let qe = parse_ok(
        "WITH RECURSIVE t (n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM t) \
         SEARCH DEPTH FIRST BY n SET ord \
         CYCLE n SET mark TO 'Y' DEFAULT 'N' USING path \
         SELECT n FROM t",
    );
    let with = qe.with_clause.as_ref().unwrap();
    assert!(with.recursive.is_some());
    assert_eq!(with.elements.len(), 1);

    let element = &with.elements[0];
    assert_eq!(element.name.name(), "t");
    assert_eq!(element.columns.as_ref().unwrap().columns[0].name(), "n");
    let inner = &element.subquery.query_expression;
    match &inner.body.kind {
        BodyKind::Compound { operator, quantifier, .. } => {
            assert!(operator.is_keyword(Keyword::Union));
            assert!(quantifier.as_ref().unwrap().is_keyword(Keyword::All));
        }
        other => panic!("{other:?}"),
    }

    let soc = element.search_or_cycle.as_ref().unwrap();
    let search = soc.search.as_ref().unwrap();
    assert_eq!(search.order, SearchOrder::DepthFirst);
    assert_eq!(search.set.name(), "ord");
    let cycle = soc.cycle.as_ref().unwrap();
    assert_eq!(cycle.mark_column.name(), "mark");
    assert_eq!(cycle.path_column.name(), "path");

    assert_eq!(columns(spec(&qe)).len(), 1);
}

#[test]
fn intersect_binds_tighter_than_union() {
    let qe = parse_ok("SELECT a FROM t UNION SELECT b FROM u INTERSECT SELECT c FROM v");
    match &qe.body.kind {
        BodyKind::Compound { left, right, corresponding, .. } => {
            assert!(matches!(left.kind, BodyKind::Term(_)));
            assert!(corresponding.is_none());
            assert!(matches!(right.kind, TermKind::Intersect { .. }));
        }
        other => panic!("{other:?}"),
    }

    let qe = parse_ok("(SELECT a FROM t ORDER BY a) EXCEPT CORRESPONDING BY (a) SELECT a FROM u");
    match &qe.body.kind {
        BodyKind::Compound { left, corresponding, .. } => {
            let TermKind::Primary(primary) = &term(left).kind else { panic!("expected a primary") };
            assert!(matches!(&primary.kind, PrimaryKind::Parenthesized { order_by: Some(_), .. }));
            assert!(corresponding.as_ref().unwrap().by.is_some());
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn values_and_explicit_table() {
    let qe = parse_ok("VALUES (1, 'a'), (2, 'b')");
    match simple(&qe.body) {
        SimpleTableKind::Values(values) => {
            assert_eq!(values.rows.len(), 2);
            assert!(matches!(&values.rows[0].kind, ExpressionKind::Row { row: None, elements } if elements.len() == 2));
        }
        other => panic!("{other:?}"),
    }

    let qe = parse_ok("TABLE s.t");
    match simple(&qe.body) {
        SimpleTableKind::Explicit(t) => assert_eq!(t.name.parts.len(), 2),
        other => panic!("{other:?}"),
    }
}

#[test]
fn value_expression_forms() {
    let qe = parse_ok(
        "SELECT CASE WHEN a BETWEEN 1 AND 2 THEN 'x' ELSE 'y' END, \
         CAST(b AS DOUBLE PRECISION), \
         c NOT IN (1, 2), \
         d LIKE 'a%' ESCAPE '!', \
         EXISTS (SELECT 1), \
         (SELECT max(e) FROM f), \
         DATE '2020-01-01', \
         -g * (h + 1) || 'z', \
         x IS NOT TRUE, \
         ROW(1, ?), \
         _latin1'abc'",
    );
    let cols = columns(spec(&qe));
    assert_eq!(cols.len(), 11);

    match &cols[0].kind {
        ExpressionKind::Case(case) => {
            assert!(case.operand.is_none());
            assert_eq!(case.whens.len(), 1);
            assert!(matches!(case.whens[0].condition.kind, ExpressionKind::Between { .. }));
            assert!(case.else_result.is_some());
        }
        other => panic!("{other:?}"),
    }
    match &cols[1].kind {
        ExpressionKind::Cast(cast) => {
            assert_eq!(cast.target.value(), "DOUBLE PRECISION");
            assert_eq!(cast.target.name.len(), 2);
        }
        other => panic!("{other:?}"),
    }
    assert!(matches!(
        &cols[2].kind,
        ExpressionKind::In { negated: true, values: InValues::List(list), .. } if list.len() == 2
    ));
    assert!(matches!(&cols[3].kind, ExpressionKind::Like { escape: Some(_), .. }));
    assert!(matches!(cols[4].kind, ExpressionKind::Exists(_)));
    assert!(matches!(cols[5].kind, ExpressionKind::ScalarSubquery(_)));
    match &cols[6].kind {
        ExpressionKind::Literal(literal) => {
            assert_eq!(literal.kind, LiteralKind::Date);
            assert!(literal.keyword.is_some());
            assert_eq!(literal.value(), "'2020-01-01'");
        }
        other => panic!("{other:?}"),
    }

    assert_eq!(operator(cols[7]), BinaryOperator::Concatenate);
    let (product, _) = operands(cols[7]);
    assert_eq!(operator(product), BinaryOperator::Multiply);
    let (negation, group) = operands(product);
    assert!(matches!(negation.kind, ExpressionKind::Unary { operator: UnaryOperator::Minus, .. }));
    assert!(matches!(group.kind, ExpressionKind::Parenthesized(_)));

    assert!(matches!(
        cols[8].kind,
        ExpressionKind::BooleanTest { negated: true, truth: TruthValue::True, .. }
    ));
    assert!(matches!(&cols[9].kind, ExpressionKind::Row { row: Some(_), elements } if elements.len() == 2));
    match &cols[10].kind {
        ExpressionKind::Literal(literal) => {
            assert_eq!(literal.kind, LiteralKind::Character);
            assert!(literal.introducer.is_some());
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn operator_precedence() {
    let qe = parse_ok("SELECT 1 + 2 * 3 = 7 OR x AND y");
    let e = columns(spec(&qe))[0];
    assert_eq!(operator(e), BinaryOperator::Or);
    let (comparison, conjunction) = operands(e);
    assert_eq!(operator(conjunction), BinaryOperator::And);
    assert_eq!(operator(comparison), BinaryOperator::Equals);
    let (sum, _) = operands(comparison);
    assert_eq!(operator(sum), BinaryOperator::Plus);
    let (_, product) = operands(sum);
    assert_eq!(operator(product), BinaryOperator::Multiply);
}

#[test]
fn parentheses_are_disambiguated() {
    let qe = parse_ok("SELECT ((SELECT 1) + 1), (1, 2), (a) FROM t");
    let cols = columns(spec(&qe));
    match &cols[0].kind {
        ExpressionKind::Parenthesized(inner) => {
            assert_eq!(operator(inner), BinaryOperator::Plus);
            let (left, _) = operands(inner);
            assert!(matches!(left.kind, ExpressionKind::ScalarSubquery(_)));
        }
        other => panic!("{other:?}"),
    }
    assert!(matches!(cols[1].kind, ExpressionKind::Row { row: None, .. }));
    assert!(matches!(cols[2].kind, ExpressionKind::Parenthesized(_)));
}

#[test]
fn node_spans_cover_their_tokens() {
    let sql = "SELECT a\n  FROM t WHERE x = 'y'";
    let qe = parse_ok(sql);
    let condition = &table(&qe).where_clause.as_ref().unwrap().condition;
    assert_eq!((condition.line(), condition.col()), (2, 16));
    assert_eq!(&sql[condition.offset()..condition.node.end()], "x = 'y'");
    let (_, literal) = operands(condition);
    assert_eq!(literal.value(), "");
    match &literal.kind {
        ExpressionKind::Literal(l) => assert_eq!(l.value(), "'y'"),
        other => panic!("{other:?}"),
    }
}

#[test]
fn empty_input_has_no_query_expression() {
    let query = parse("").unwrap();
    assert!(query.query_expression.is_none());
    assert_eq!((query.offset(), query.length()), (0, 0));
    assert!(!query.has_value());

    let sql = "  -- nothing here\n";
    let query = parse(sql).unwrap();
    assert!(query.query_expression.is_none());
    assert_eq!(query.length(), sql.len());
}

#[test]
fn lexical_errors_are_reported_as_scanner_errors() {
    let err = parse("SELECT \"abc").unwrap_err();
    let Error::Scanner(diagnostics) = &err else { panic!("{err:?}") };
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Lexical);
    assert!(diagnostics[0].message.contains("expected Double Quote"));
    assert_eq!(diagnostics[0].offset, 7);
    assert!(err.to_string().starts_with("Scanner error: ["));
    assert_eq!(err.diagnostics().len(), diagnostics.len());
}

#[test]
fn syntax_errors_are_aggregated() {
    let err = parse("SELECT a +, b +, c FROM t").unwrap_err();
    let Error::Parser(diagnostics) = &err else { panic!("{err:?}") };
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::Syntactic));
    assert!(diagnostics[0].message.starts_with("expected value expression, found SQLSpecialCharacter"));
    assert_eq!((diagnostics[0].col, diagnostics[0].offset), (11, 10));
    assert_eq!(diagnostics[1].offset, 15);
    assert!(err.to_string().starts_with("Parser error: [1:11: expected value expression"));
}

#[test]
fn leftover_tokens_are_rejected() {
    let err = parse("SELECT a FROM t t2 t3").unwrap_err();
    let Error::Parser(diagnostics) = &err else { panic!("{err:?}") };
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("expected end of statement"));
    assert!(diagnostics[0].message.contains("\"t3\""));
}

#[test]
fn missing_pieces_are_reported_at_end_of_input() {
    let err = parse("SELECT * FROM a JOIN b").unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "expected ON or USING, found end of input");
    assert_eq!(diagnostics[0].offset, "SELECT * FROM a JOIN b".len());

    let err = parse("SELECT").unwrap_err();
    assert_eq!(err.diagnostics()[0].message, "expected select sublist, found end of input");
}

#[test]
fn accumulation_times_out() {
    let config = ParserConfig { accumulate_timeout_ms: 50, ..ParserConfig::default() };
    let result = Isolate::new("SELECT 1", &config).parse_with(|stream| {
        while !stream.is_closed() {
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    });
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(50)));
    assert_eq!(err.to_string(), "accumulate tokens: Operation timed out (50ms)");
    assert!(err.diagnostics().is_empty());
}

#[test]
fn scanner_abort_is_unrecoverable() {
    let err = parse("a # b").unwrap_err();
    match &err {
        Error::Unrecoverable { fault: Fault::Scanner(ScanFault::UnexpectedRune { rune, .. }), collected } => {
            assert_eq!(*rune, '#');
            assert!(collected.is_empty());
        }
        other => panic!("{other:?}"),
    }
    assert!(err.to_string().starts_with("fatal error: Unrecoverable error: "));

    let err = parse("X'zz' #").unwrap_err();
    let Error::Unrecoverable { collected, .. } = &err else { panic!("{err:?}") };
    assert_eq!(collected.len(), 1);
    assert!(err.to_string().contains("(other errors while parsing: [1:1: "));
}

#[test]
fn producer_panic_is_unrecoverable() {
    let config = ParserConfig::default();
    let result = Isolate::new("SELECT 1", &config)
        .parse_with(|_: Arc<dyn Stream>| -> Result<(), ScanFault> { panic!("boom") });
    match result {
        Err(Error::Unrecoverable { fault: Fault::Scanner(ScanFault::Panicked(message)), .. }) => {
            assert_eq!(message, "boom");
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn nesting_is_bounded() {
    let parser = Parser::with_config(ParserConfig { max_depth: 4, ..ParserConfig::default() });
    let err = parser.parse("SELECT ((((((1))))))").unwrap_err();
    assert!(matches!(err, Error::Unrecoverable { fault: Fault::DepthExceeded(4), .. }));

    let nested = format!("SELECT {}1{}", "(".repeat(20), ")".repeat(20));
    assert!(parse(&nested).is_ok());
}

fn nested_value(levels: usize) -> String {
    format!("SELECT {}1{}", "(".repeat(levels), ")".repeat(levels))
}

fn nested_query(levels: usize) -> String {
    format!("{}SELECT 1{}", "(".repeat(levels), ")".repeat(levels))
}

#[test]
fn nesting_up_to_the_default_limit_fits_the_stack() {
    let limit = ParserConfig::default().max_depth;

    // The query expression and the select item take one level each.
    assert!(parse(&nested_value(limit - 2)).is_ok());
    assert!(parse(&nested_query(limit - 2)).is_ok());

    for sql in [nested_value(limit - 1), nested_query(limit - 1), nested_value(limit * 4)] {
        match parse(&sql) {
            Err(Error::Unrecoverable { fault: Fault::DepthExceeded(n), .. }) => assert_eq!(n, limit),
            other => panic!("{other:?}"),
        }
    }
}

#[test]
fn deep_configured_limit_fits_the_stack() {
    let parser = Parser::with_config(ParserConfig { max_depth: 400, ..ParserConfig::default() });
    assert!(parser.parse(&nested_value(398)).is_ok());
    let mixed = format!("SELECT {}(SELECT 1){}", "(".repeat(150), ")".repeat(150));
    assert!(parser.parse(&mixed).is_ok());
}

#[test]
fn oversized_limit_is_capped() {
    let parser = Parser::with_config(ParserConfig { max_depth: usize::MAX, ..ParserConfig::default() });
    let levels = crate::config::MAX_DEPTH_LIMIT + 10;
    match parser.parse(&nested_value(levels)) {
        Err(Error::Unrecoverable { fault: Fault::DepthExceeded(n), .. }) => {
            assert_eq!(n, crate::config::MAX_DEPTH_LIMIT)
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn keyword_and_type_acceptors_are_atomic() {
    let config = ParserConfig::default();
    let mut p = isolate("ORDER x", &config);
    assert!(p.accept_keywords(&[Keyword::Order, Keyword::By]).is_none());
    assert_eq!(p.pos, 0);
    assert!(p
        .accept_token_sequence(&[TokenType::KeyWord, TokenType::KeyWord])
        .is_none());
    assert_eq!(p.pos, 0);
    let pair = p.accept_token_sequence(&[TokenType::KeyWord, TokenType::RegularIdentifier]).unwrap();
    assert_eq!(pair[1].value, "x");
    assert!(p.done());
}

#[test]
fn cursor_primitives() {
    let config = ParserConfig::default();
    let mut p = isolate("a , b", &config);
    assert!(p.accept_token(TokenType::KeyWord).is_none());
    assert_eq!(p.pos, 0);
    assert_eq!(p.peek_nth(2).map(|t| t.value.as_str()), Some("b"));
    assert!(p.accept_one_of_types(&[TokenType::DelimitedIdentifier, TokenType::RegularIdentifier]).is_some());
    assert!(p.peek_special(','));
    p.goback();
    p.goback();
    assert_eq!(p.pos, 0);
    while p.next().is_some() {}
    assert!(p.done());
    assert!(p.next().is_none());
}

#[test]
fn attempt_rolls_back_position_and_diagnostics() {
    let config = ParserConfig::default();
    let mut p = isolate("SELECT a", &config);
    let result = p
        .attempt(|p| {
            p.next();
            p.expected("nothing");
            Ok(None::<()>)
        })
        .unwrap();
    assert!(result.is_none());
    assert_eq!(p.pos, 0);
    assert!(p.diagnostics().is_empty());

    p.next();
    p.next();
    p.expected("more");
    let diagnostics = p.diagnostics();
    assert_eq!(diagnostics[0].message, "expected more, found end of input");
    assert_eq!((diagnostics[0].line, diagnostics[0].col, diagnostics[0].offset), (1, 9, 8));
}

#[test]
fn parser_keeps_its_config() {
    let config = ParserConfig { stream_capacity: 1, ..ParserConfig::default() };
    let parser = Parser::with_config(config.clone());
    assert_eq!(parser.config(), &config);
    assert!(parser.parse("SELECT a, b, c, d, e FROM t WHERE a = 1").is_ok());
}
