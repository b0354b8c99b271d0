//! Command-line interface for recast.
//!
//! Usage:
//!   recast detect <path>                       - Report the detected language
//!   recast strip <path> [--all | --markers m]  - Remove comments
//!   recast minify <path>                       - Minify to one line
//!   recast format <path> [--indent <n>]        - Reformat / pretty-print
//!   recast obfuscate <path> --method <m>       - Encode source
//!   recast deobfuscate <path>                  - Heuristically decode
//!
//! A path of `-` reads from standard input.

use std::io::Read;

use clap::{Arg, ArgAction, ArgMatches, Command};

use recast::lang::LanguageTag;
use recast::obfuscate::ObfuscationMethod;
use recast::pretty::IndentSpec;
use recast::strip::MarkerSelection;

fn main() {
    let input_arg = Arg::new("path")
        .help("Input file, or '-' for standard input")
        .required(true)
        .index(1);
    let lang_arg = Arg::new("lang")
        .long("lang")
        .short('l')
        .help("Language (html, css, js, php, json, python, plain); detected when omitted");

    let matches = Command::new("recast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Best-effort structural transformations for source text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("detect")
                .about("Report the detected language")
                .arg(input_arg.clone()),
        )
        .subcommand(
            Command::new("strip")
                .about("Remove comments")
                .arg(input_arg.clone())
                .arg(lang_arg.clone())
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Remove every known comment syntax, ignoring language")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("markers")
                        .long("markers")
                        .help("Comma-separated comment syntaxes to remove (html, block, line, hash)")
                        .conflicts_with("all"),
                ),
        )
        .subcommand(
            Command::new("minify")
                .about("Minify to a single line")
                .arg(input_arg.clone())
                .arg(lang_arg.clone()),
        )
        .subcommand(
            Command::new("format")
                .about("Reformat / pretty-print")
                .arg(input_arg.clone())
                .arg(lang_arg.clone())
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .help("Spaces per indent level")
                        .default_value("4"),
                )
                .arg(
                    Arg::new("tabs")
                        .long("tabs")
                        .help("Indent with tabs instead of spaces")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("sort-keys")
                        .long("sort-keys")
                        .help("Sort object keys (JSON only)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("max-blank-lines")
                        .long("max-blank-lines")
                        .help("Maximum run of blank lines kept in the output")
                        .default_value("1"),
                )
                .arg(
                    Arg::new("keep-trailing-space")
                        .long("keep-trailing-space")
                        .help("Keep trailing spaces and tabs on lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("obfuscate")
                .about("Encode source with a reversible wrapper")
                .arg(input_arg.clone())
                .arg(lang_arg.clone())
                .arg(
                    Arg::new("method")
                        .long("method")
                        .short('m')
                        .help("Encoding method (eval64, hex, container)")
                        .default_value("eval64"),
                )
                .arg(
                    Arg::new("comment")
                        .long("comment")
                        .help("Comment text prepended to the encoded output"),
                ),
        )
        .subcommand(
            Command::new("deobfuscate")
                .about("Heuristically decode obfuscated source")
                .arg(input_arg),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("detect", sub)) => handle_detect(sub),
        Some(("strip", sub)) => handle_strip(sub),
        Some(("minify", sub)) => handle_minify(sub),
        Some(("format", sub)) => handle_format(sub),
        Some(("obfuscate", sub)) => handle_obfuscate(sub),
        Some(("deobfuscate", sub)) => handle_deobfuscate(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn read_input(matches: &ArgMatches) -> String {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    if path == "-" {
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(1);
        }
        buf
    } else {
        std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        })
    }
}

/// Explicit `--lang` wins; otherwise detect from the input itself.
fn resolve_lang(matches: &ArgMatches, code: &str) -> LanguageTag {
    match matches.get_one::<String>("lang") {
        Some(name) => name.parse().unwrap_or_else(|e| {
            eprintln!("{}", e);
            eprintln!("Supported: html, css, js, php, json, python, plain");
            std::process::exit(1);
        }),
        None => recast::detect_language(code),
    }
}

fn handle_detect(matches: &ArgMatches) {
    let code = read_input(matches);
    println!("{}", recast::detect_language(&code));
}

fn handle_strip(matches: &ArgMatches) {
    let code = read_input(matches);
    let out = if matches.get_flag("all") {
        recast::strip_comments_all(&code)
    } else if let Some(spec) = matches.get_one::<String>("markers") {
        recast::strip_comments_custom(&code, parse_markers(spec))
    } else {
        let lang = resolve_lang(matches, &code);
        recast::strip_comments(&code, lang)
    };
    print!("{}", out);
}

fn parse_markers(spec: &str) -> MarkerSelection {
    let mut sel = MarkerSelection::default();
    for part in spec.split(',') {
        match part.trim().to_ascii_lowercase().as_str() {
            "html" => sel.html = true,
            "block" => sel.c_block = true,
            "line" => sel.c_line = true,
            "hash" => sel.hash = true,
            "" => {}
            other => {
                eprintln!("Unknown marker '{}'", other);
                eprintln!("Supported: html, block, line, hash");
                std::process::exit(1);
            }
        }
    }
    sel
}

fn handle_minify(matches: &ArgMatches) {
    let code = read_input(matches);
    let lang = resolve_lang(matches, &code);
    println!("{}", recast::minify(&code, lang));
}

fn handle_format(matches: &ArgMatches) {
    let code = read_input(matches);
    let lang = resolve_lang(matches, &code);
    let indent = IndentSpec {
        use_tabs: matches.get_flag("tabs"),
        size: parse_number(matches, "indent"),
    };
    let sort_keys = matches.get_flag("sort-keys");
    let max_blank = parse_number(matches, "max-blank-lines");
    let trim_trailing = !matches.get_flag("keep-trailing-space");

    let formatted = recast::pretty_format(&code, lang, indent, sort_keys);
    let tidied = recast::tidy_whitespace(&formatted, max_blank, trim_trailing);
    println!("{}", tidied);
}

fn parse_number(matches: &ArgMatches, name: &str) -> usize {
    let raw = matches
        .get_one::<String>(name)
        .expect("argument has a default");
    raw.parse().unwrap_or_else(|_| {
        eprintln!("--{} expects a number, got '{}'", name, raw);
        std::process::exit(1);
    })
}

fn handle_obfuscate(matches: &ArgMatches) {
    let code = read_input(matches);
    let lang = resolve_lang(matches, &code);
    let method: ObfuscationMethod = matches
        .get_one::<String>("method")
        .expect("method has a default")
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            eprintln!("Supported: eval64, hex, container");
            std::process::exit(1);
        });

    let mut out = recast::obfuscate(&code, lang, method);
    if let Some(comment) = matches.get_one::<String>("comment") {
        out = recast::append_comment(&out, method.output_language(lang), comment);
    }
    println!("{}", out);
}

fn handle_deobfuscate(matches: &ArgMatches) {
    let code = read_input(matches);
    match recast::deobfuscate(&code) {
        Some(decoded) => println!("{}", decoded),
        None => {
            eprintln!("Nothing recognizable to decode");
            std::process::exit(1);
        }
    }
}
