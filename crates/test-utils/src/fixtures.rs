// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample Jasmin sources

/// Sample Jasmin sources for testing
pub struct JazzFixtures;

impl JazzFixtures {
    // ===== Declarations =====

    /// A single literal param
    pub const fn simple_param() -> &'static str {
        "param int ROUNDS = 24;"
    }

    /// Params referencing each other
    pub const fn chained_params() -> &'static str {
        "param int BASE = 42;\nparam int NEXT = BASE + 1;\nparam int DOUBLE = NEXT * 2;"
    }

    /// A documented param
    pub const fn documented_param() -> &'static str {
        "// Number of permutation rounds.\nparam int ROUNDS = 24;"
    }

    /// A global array
    pub const fn global_table() -> &'static str {
        "u64[4] round_constants = { 1, 0x8082, 0x808a, 0x80008000 };"
    }

    /// A type alias
    pub const fn type_alias() -> &'static str {
        "type row = u64[5];"
    }

    // ===== Functions =====

    /// Function with two parameters and a local
    pub const fn add_function() -> &'static str {
        "export fn add(reg u64 x, reg u64 y) -> reg u64 {\n  reg u64 r;\n  r = x + y;\n  return r;\n}"
    }

    /// Function body with a multi-name declaration (comma separated)
    pub const fn multi_variable_function() -> &'static str {
        "fn f() {\n  reg u32 i, j;\n  i = 0;\n  j = i;\n}"
    }

    /// Two functions each declaring a local of the same name
    pub const fn shadowed_locals() -> &'static str {
        "fn f() {\n  reg u64 status;\n  status = 1;\n}\n\nfn g() {\n  reg u64 status;\n  status = 2;\n}"
    }

    // ===== Errors =====

    /// Source with a syntax error
    pub const fn broken_function() -> &'static str {
        "fn broken( {\n  reg u64 x\n}"
    }
}
