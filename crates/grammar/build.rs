use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=src/grammar/grammar.js");
    println!("cargo:rustc-check-cfg=cfg(jasmin_grammar_compiled)");

    let grammar_dir = Path::new("src/grammar");
    let out_dir = env::var("OUT_DIR").unwrap();

    let cached_parser = grammar_dir.join("gen/parser.c");

    // Regenerate only when grammar.js is newer than the cached parser
    if needs_regeneration(grammar_dir, &cached_parser) {
        println!("cargo:warning=Generating Jasmin grammar");

        let status = Command::new("tree-sitter")
            .args(["generate", "-o", "gen"])
            .current_dir(grammar_dir)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                println!(
                    "cargo:warning=Failed to generate Jasmin grammar: exit code {:?}",
                    s.code()
                );
            }
            Err(e) => {
                println!("cargo:warning=Failed to run tree-sitter: {}", e);
                println!("cargo:warning=Install tree-sitter-cli: npm install -g tree-sitter-cli");
            }
        }
    }

    if cached_parser.exists() {
        let dest_path = Path::new(&out_dir).join("parser.c");
        fs::copy(&cached_parser, &dest_path).expect("Failed to copy parser.c");

        cc::Build::new()
            .include(grammar_dir.join("gen"))
            .file(&dest_path)
            .compile("tree-sitter-jasmin");

        println!("cargo:rustc-cfg=jasmin_grammar_compiled");
    } else {
        println!(
            "cargo:warning=Jasmin grammar not compiled; jasmin_grammar::language() will return None"
        );
    }
}

fn needs_regeneration(grammar_dir: &Path, cached_parser: &Path) -> bool {
    if !cached_parser.exists() {
        return true;
    }

    let grammar_time = fs::metadata(grammar_dir.join("grammar.js"))
        .ok()
        .and_then(|m| m.modified().ok());
    let parser_time = fs::metadata(cached_parser)
        .ok()
        .and_then(|m| m.modified().ok());

    match (grammar_time, parser_time) {
        (Some(g), Some(p)) => g > p,
        _ => true,
    }
}
