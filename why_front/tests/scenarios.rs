//! Whole-pipeline scenario and property tests, sitting one level above
//! the per-node unit tests that stay inline in `src/`. Exercises the
//! public surface only (`parser::parse`, `optimizer::optimize`,
//! `optimizer::validator`), the way an external consumer of this crate
//! would.

use proptest::prelude::*;

use why_front::ast::{BinaryOperator, Declaration, Expression, Statement};
use why_front::optimizer::{self, validator, Level};
use why_front::parser::{self, recovery::RecoveryMode, recovery::Severity, ParserConfig};

fn parse_ok(source: &str) -> why_front::ast::Module {
    let outcome = parser::parse(source, "<scenario>");
    assert!(
        !outcome.has_errors(),
        "expected clean parse of {source:?}, got: {:#?}",
        outcome.diagnostics
    );
    outcome.module
}

fn single_function(module: &why_front::ast::Module) -> &why_front::ast::FunctionDeclaration {
    assert_eq!(module.len(), 1);
    match &module[0] {
        Declaration::Function(f) => f,
        other => panic!("expected a function declaration, got {other:?}"),
    }
}

fn return_expr(stmts: &[Statement]) -> &Expression {
    match stmts.last() {
        Some(Statement::Return { value: Some(expr), .. }) => expr,
        other => panic!("expected a trailing return, got {other:?}"),
    }
}

// --- Scenario 1: operator precedence ------------------------------------

#[test]
fn scenario_precedence_multiplication_binds_tighter_than_addition() {
    let module = parse_ok("fn f() {\nreturn 1 + 2 * 3;\n}");
    let f = single_function(&module);
    match return_expr(&f.body) {
        Expression::Binary { operator: BinaryOperator::Add, left, right, .. } => {
            assert!(matches!(**left, Expression::Integer { value: 1, .. }));
            assert!(matches!(**right, Expression::Binary { operator: BinaryOperator::Multiply, .. }));
        }
        other => panic!("expected top-level addition, got {other:?}"),
    }
}

#[test]
fn scenario_precedence_power_is_right_associative() {
    let module = parse_ok("fn f() {\nreturn 2 ** 3 ** 2;\n}");
    let f = single_function(&module);
    match return_expr(&f.body) {
        Expression::Binary { operator: BinaryOperator::Power, left, right, .. } => {
            assert!(matches!(**left, Expression::Integer { value: 2, .. }));
            assert!(matches!(**right, Expression::Binary { operator: BinaryOperator::Power, .. }));
        }
        other => panic!("expected right-associative power, got {other:?}"),
    }
}

// --- Scenario 2: constant folding ----------------------------------------

#[test]
fn scenario_constant_folding_collapses_arithmetic() {
    let module = parse_ok("fn f() {\nreturn 1 + 2 * 3;\n}");
    let (module, reports) = optimizer::optimize(module, Level::Basic);
    let f = single_function(&module);
    match return_expr(&f.body) {
        Expression::Integer { value, .. } => assert_eq!(*value, 7),
        other => panic!("expected constant-folded 7, got {other:?}"),
    }
    assert!(reports.iter().any(|r| r.pass_name == "constant-folding"));
}

// --- Scenario 3: dead-loop elimination -----------------------------------

#[test]
fn scenario_dead_while_loop_is_removed() {
    let module = parse_ok("fn f() {\nwhile false {\nlet x = 1;\n}\nreturn 0;\n}");
    let (module, _) = optimizer::optimize(module, Level::Default);
    let f = single_function(&module);
    assert_eq!(f.body.len(), 1);
    assert!(matches!(f.body[0], Statement::Return { .. }));
}

// --- Scenario 4: error recovery across a malformed declaration ----------

#[test]
fn scenario_recovers_past_a_malformed_declaration_and_keeps_parsing() {
    let source = "fn broken( {\nreturn 1;\n}\nfn ok() {\nreturn 2;\n}";
    let outcome = parser::parse(source, "<scenario>");
    assert!(outcome.has_errors());
    assert!(
        outcome.module.iter().any(|d| matches!(d, Declaration::Function(f) if f.name.name == "ok")),
        "expected parsing to recover and still find 'ok', got: {:#?}",
        outcome.module
    );
}

// --- Scenario 5: fuzzy keyword suggestion --------------------------------

#[test]
fn scenario_misspelled_keyword_gets_a_fuzzy_suggestion() {
    let outcome = parser::parse("retrun 1;", "<scenario>");
    assert!(outcome.has_errors());
    let has_fuzzy_hint = outcome.diagnostics.iter().any(|d| {
        d.suggestions.iter().any(|s| {
            s.kind == why_front::parser::recovery::SuggestionKind::ErrorFix
                && s.category == why_front::parser::recovery::SuggestionCategory::Syntax
                && s.replacement.as_deref() == Some("return")
        })
    });
    assert!(has_fuzzy_hint, "expected a fuzzy-keyword suggestion for 'retrun', got: {:#?}", outcome.diagnostics);
}

// --- Recovery mode selection and the Query/Configure interfaces ----------

#[test]
fn panic_mode_resynchronizes_past_a_malformed_declaration() {
    let source = "fn broken( {\nreturn 1;\n}\nfn ok() {\nreturn 2;\n}";
    let config = ParserConfig { recovery_mode: RecoveryMode::Panic, ..ParserConfig::default() };
    let outcome = parser::parse_with_config(source, "<scenario>", &config);
    assert!(outcome.has_errors());
    assert!(outcome.module.iter().any(|d| matches!(d, Declaration::Function(f) if f.name.name == "ok")));
    assert_eq!(outcome.statistics.global_recoveries, 0);
}

#[test]
fn global_mode_records_its_panic_net_fallback() {
    let source = "fn broken( {\nreturn 1;\n}\nfn ok() {\nreturn 2;\n}";
    let config = ParserConfig { recovery_mode: RecoveryMode::Global, ..ParserConfig::default() };
    let outcome = parser::parse_with_config(source, "<scenario>", &config);
    assert!(outcome.has_errors());
    assert!(outcome.statistics.global_recoveries > 0);
}

#[test]
fn configured_max_errors_truncates_and_is_reported_in_statistics() {
    let garbage = "fn\n".repeat(10);
    let config = ParserConfig { max_errors: 2, ..ParserConfig::default() };
    let outcome = parser::parse_with_config(&garbage, "<scenario>", &config);
    assert!(outcome.statistics.error_count <= 2);
    assert!(outcome.truncated);
    assert!(outcome.statistics.error_cap_hit);
}

#[test]
fn disabling_suggestions_leaves_diagnostics_with_no_suggestions() {
    let config = ParserConfig { suggestions_enabled: false, ..ParserConfig::default() };
    let outcome = parser::parse_with_config("retrun 1;", "<scenario>", &config);
    assert!(outcome.has_errors());
    assert!(outcome.diagnostics.iter().all(|d| d.suggestions.is_empty()));
    assert_eq!(outcome.statistics.suggestion_count, 0);
}

// --- Scenario 6: match with guards and no trailing commas ----------------

#[test]
fn scenario_match_with_guards_and_no_commas_between_arms() {
    let module = parse_ok(
        "fn classify(x: i32) -> i32 {\n\
         match (x) {\n\
         2 if x > 1 => return 2\n\
         3 => return 3\n\
         }\n\
         }",
    );
    let f = single_function(&module);
    let arms = f
        .body
        .iter()
        .find_map(|s| match s {
            Statement::Match { arms, .. } => Some(arms),
            _ => None,
        })
        .expect("function body contains a match statement");
    assert_eq!(arms.len(), 2);
    assert!(arms[0].guard.is_some());
    assert!(matches!(*arms[0].body, Statement::Return { .. }));
    assert!(matches!(*arms[1].body, Statement::Return { .. }));
}

// --- Universal invariants (proptest) -------------------------------------

fn arbitrary_integer_expr() -> impl Strategy<Value = String> {
    (1i64..1000).prop_map(|n| n.to_string())
}

fn arbitrary_arith_chain() -> impl Strategy<Value = String> {
    prop::collection::vec(arbitrary_integer_expr(), 2..6).prop_map(|parts| parts.join(" + "))
}

proptest! {
    #[test]
    fn parsing_arbitrary_arithmetic_chains_terminates_and_round_trips(expr in arbitrary_arith_chain()) {
        let source = format!("fn f() {{\nreturn {expr};\n}}");
        let outcome = parser::parse(&source, "<prop>");
        prop_assert!(!outcome.has_errors());

        let printed = validator::pretty_print(&outcome.module);
        let reparsed = parser::parse(&printed, "<prop2>");
        prop_assert!(!reparsed.has_errors(), "reparse of pretty-printed output failed: {:#?}", reparsed.diagnostics);
        prop_assert_eq!(outcome.module, reparsed.module);
    }

    #[test]
    fn optimizer_is_idempotent_on_arbitrary_arithmetic(expr in arbitrary_arith_chain()) {
        let source = format!("fn f() {{\nreturn {expr};\n}}");
        let outcome = parser::parse(&source, "<prop>");
        prop_assert!(!outcome.has_errors());

        let (once, _) = optimizer::optimize(outcome.module, Level::Aggressive);
        let (twice, reports_second_pass) = optimizer::optimize(once.clone(), Level::Aggressive);
        prop_assert_eq!(once, twice);
        for report in reports_second_pass {
            prop_assert_eq!(report.metrics.nodes_optimized, 0);
        }
    }

    #[test]
    fn constant_folding_preserves_the_exact_wrapping_sum(values in prop::collection::vec(1i64..1000, 2..6)) {
        let expr = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" + ");
        let source = format!("fn f() {{\nreturn {expr};\n}}");
        let outcome = parser::parse(&source, "<prop>");
        prop_assert!(!outcome.has_errors());

        let (module, _) = optimizer::optimize(outcome.module, Level::Basic);
        let f = single_function(&module);
        let expected = values.iter().fold(0i64, |acc, v| acc.wrapping_add(*v));
        let folded = match return_expr(&f.body) {
            Expression::Integer { value, .. } => Some(*value),
            _ => None,
        };
        prop_assert_eq!(folded, Some(expected));
    }

    #[test]
    fn parse_error_count_never_exceeds_the_configured_cap(garbage in "[-+*/(){}; ]{0,500}") {
        let outcome = parser::parse(&garbage, "<prop>");
        let error_count = outcome.diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        prop_assert!(error_count <= 5000);
        prop_assert_eq!(error_count, outcome.statistics.error_count);
    }

    #[test]
    fn every_node_span_encloses_its_direct_children(expr in arbitrary_arith_chain()) {
        let source = format!("fn f() {{\nreturn {expr};\n}}");
        let outcome = parser::parse(&source, "<prop>");
        prop_assert!(!outcome.has_errors());
        let f = single_function(&outcome.module);
        assert_spans_enclose(return_expr(&f.body));
    }
}

fn assert_spans_enclose(expr: &Expression) {
    if let Expression::Binary { left, right, span, .. } = expr {
        assert!(span.encloses(left.span()));
        assert!(span.encloses(right.span()));
        assert_spans_enclose(left);
        assert_spans_enclose(right);
    }
}
