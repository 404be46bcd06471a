// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Jasmin Keywords
//!
//! This module provides hover documentation for the Jasmin keyword set.
//! Hover on a keyword answers from this table and never falls through to
//! the symbol search.

/// Check whether a word is a Jasmin keyword
pub fn is_keyword(word: &str) -> bool {
    keyword_documentation(word).is_some()
}

/// Get documentation for a Jasmin keyword
///
/// # Returns
///
/// - `Some(text)` - Markdown documentation for the keyword
/// - `None` - The word is not a keyword
pub fn keyword_documentation(word: &str) -> Option<&'static str> {
    let doc = match word {
        "fn" => "Declares a function.",
        "inline" => {
            "Marks a function or variable as inline: it exists only at compile time and is expanded at each use site."
        }
        "export" => "Marks a function as externally callable, giving it a C ABI entry point.",
        "return" => "Returns the listed values from the current function.",
        "if" => "Conditional execution.",
        "else" => "Alternative branch of an `if`.",
        "while" => "Loop executing while the condition holds.",
        "for" => "Compile-time counted loop, unrolled during compilation.",
        "require" => "Includes another Jasmin source file, resolved relative to the current file.",
        "from" => {
            "Namespace qualifier for `require`; the file is searched inside the named namespace directory."
        }
        "param" => "Declares a compile-time constant, usable in types and expressions.",
        "global" => "Declares a global value stored in the executable image.",
        "reg" => "Storage class: the value lives in a machine register.",
        "stack" => "Storage class: the value lives on the stack.",
        "const" => "Marks a pointer as read-only.",
        "int" => "Unbounded compile-time integer type.",
        "u8" => "8-bit machine word.",
        "u16" => "16-bit machine word.",
        "u32" => "32-bit machine word.",
        "u64" => "64-bit machine word.",
        "u128" => "128-bit vector word.",
        "u256" => "256-bit vector word.",
        _ => return None,
    };
    Some(doc)
}
