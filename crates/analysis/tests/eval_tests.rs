// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Constant evaluator tests
//!
//! All tests skip when the Jasmin grammar was not compiled into the build.

use std::sync::Arc;

use jasmin_lsp_analysis::eval::ConstEvaluator;
use jasmin_lsp_analysis::graph::SourceMap;
use jasmin_lsp_analysis::symbols::{SymbolExtractor, SymbolKind};
use jasmin_lsp_syntax::ParserPool;
use jasmin_lsp_test_utils::JazzFixtures;
use lsp_types::Url;

fn pool() -> Option<ParserPool> {
    match ParserPool::new() {
        Ok(p) => Some(p),
        Err(_) => {
            println!("Skipping test: Jasmin grammar not compiled");
            None
        }
    }
}

/// Build a SourceMap from (path, source) pairs
fn source_map(pool: &ParserPool, files: &[(&str, &str)]) -> SourceMap {
    let mut map = SourceMap::new();
    for (path, source) in files {
        let uri = Url::from_file_path(path).unwrap();
        map.insert(uri, Arc::new(pool.parse(source, None).unwrap()));
    }
    map
}

#[test]
fn test_literal_param() {
    let Some(pool) = pool() else { return };

    let map = source_map(&pool, &[("/p/a.jazz", JazzFixtures::simple_param())]);
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("ROUNDS"), Some(&24));
}

#[test]
fn test_literal_radixes_and_separators() {
    let Some(pool) = pool() else { return };

    let map = source_map(
        &pool,
        &[(
            "/p/a.jazz",
            "param int HEX = 0x2A;\nparam int BIN = 0b1010;\nparam int SEP = 1_000;",
        )],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("HEX"), Some(&42));
    assert_eq!(values.get("BIN"), Some(&10));
    assert_eq!(values.get("SEP"), Some(&1000));
}

#[test]
fn test_operator_precedence_follows_c() {
    let Some(pool) = pool() else { return };

    let map = source_map(
        &pool,
        &[(
            "/p/a.jazz",
            "param int A = 2 + 3 * 4;\n\
             param int B = (2 + 3) * 4;\n\
             param int C = 1 << 2 + 1;\n\
             param int D = 8 | 4 & 6;\n\
             param int E = 10 - 4 - 3;",
        )],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("A"), Some(&14));
    assert_eq!(values.get("B"), Some(&20));
    // << binds looser than +
    assert_eq!(values.get("C"), Some(&8));
    // & binds tighter than |
    assert_eq!(values.get("D"), Some(&12));
    // left associativity
    assert_eq!(values.get("E"), Some(&3));
}

#[test]
fn test_unary_operators() {
    let Some(pool) = pool() else { return };

    let map = source_map(
        &pool,
        &[(
            "/p/a.jazz",
            "param int NEG = -5;\nparam int NOT = !0;\nparam int NOTNZ = !7;\nparam int INV = ~0;",
        )],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("NEG"), Some(&-5));
    assert_eq!(values.get("NOT"), Some(&1));
    assert_eq!(values.get("NOTNZ"), Some(&0));
    assert_eq!(values.get("INV"), Some(&-1));
}

#[test]
fn test_params_resolve_across_files() {
    let Some(pool) = pool() else { return };

    // The dependency order is deliberately reversed in the map: the
    // fixpoint picks BASE up in pass one and NEXT in pass two.
    let map = source_map(
        &pool,
        &[
            ("/p/top.jazz", "param int NEXT = BASE + 1;"),
            ("/p/base.jinc", "param int BASE = 42;"),
        ],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("BASE"), Some(&42));
    assert_eq!(values.get("NEXT"), Some(&43));
}

#[test]
fn test_chained_params_resolve_in_passes() {
    let Some(pool) = pool() else { return };

    let map = source_map(&pool, &[("/p/a.jazz", JazzFixtures::chained_params())]);
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("BASE"), Some(&42));
    assert_eq!(values.get("NEXT"), Some(&43));
    assert_eq!(values.get("DOUBLE"), Some(&86));
}

#[test]
fn test_division_by_zero_stays_unevaluated() {
    let Some(pool) = pool() else { return };

    let map = source_map(
        &pool,
        &[("/p/a.jazz", "param int D = 1 / 0;\nparam int M = 1 % 0;\nparam int OK = 5;")],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("D"), None);
    assert_eq!(values.get("M"), None);
    assert_eq!(values.get("OK"), Some(&5));
}

#[test]
fn test_cyclic_params_stay_unevaluated() {
    let Some(pool) = pool() else { return };

    let map = source_map(
        &pool,
        &[("/p/a.jazz", "param int A = B + 1;\nparam int B = A + 1;")],
    );
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("A"), None);
    assert_eq!(values.get("B"), None);
}

#[test]
fn test_unknown_identifier_stays_unevaluated() {
    let Some(pool) = pool() else { return };

    let map = source_map(&pool, &[("/p/a.jazz", "param int X = MISSING * 2;")]);
    let values = ConstEvaluator::evaluate(&map);

    assert_eq!(values.get("X"), None);
}

#[test]
fn test_annotate_rewrites_detail_for_derived_values() {
    let Some(pool) = pool() else { return };

    let map = source_map(&pool, &[("/p/a.jazz", JazzFixtures::chained_params())]);
    let uri = Url::from_file_path("/p/a.jazz").unwrap();
    let cst = map.get(&uri).unwrap();

    let mut symbols = SymbolExtractor::extract(&uri, cst);
    let values = ConstEvaluator::evaluate(&map);
    ConstEvaluator::annotate(&mut symbols, &values);

    let next = symbols
        .iter()
        .find(|s| s.name == "NEXT")
        .expect("NEXT symbol");
    assert_eq!(next.computed_value, Some(43));
    assert_eq!(next.detail.as_deref(), Some("int = BASE + 1 = 43"));

    // A plain literal produces no duplicated value
    let base = symbols
        .iter()
        .find(|s| s.name == "BASE")
        .expect("BASE symbol");
    assert_eq!(base.computed_value, Some(42));
    assert_eq!(base.detail.as_deref(), Some("int = 42"));
    assert_eq!(
        symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Constant)
            .count(),
        3
    );
}
