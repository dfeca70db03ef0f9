use std::process::ExitCode;

use flagset::{FlagSet, ParseError};

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let tokens: Vec<&str> = argv.iter().map(String::as_str).collect();

    let mut set = FlagSet::console("grepple [flags] <pattern> [file ...]");
    let ignore_case = set.bool("i,ignore-case", "Match case-insensitively.");
    let count = set.bool("c,count", "Print only a count of matching lines.");
    let context = set.int("C,context", "Print `num` lines of surrounding context.");
    let excludes = set.strings("x,exclude", "Skip files matching `glob`; repeatable.");

    match set.parse(&tokens) {
        Ok(()) => {}
        Err(ParseError::HelpRequested) => return ExitCode::SUCCESS,
        Err(_) => return ExitCode::from(2),
    }

    if set.arg(0).is_empty() {
        set.print_error("a pattern is required");
        return ExitCode::from(2);
    }

    println!("pattern: {}", set.arg(0));
    println!("files: {:?}", &set.args()[1..]);
    println!("ignore-case: {}", ignore_case.borrow());
    println!("count-only: {}", count.borrow());
    println!("context: {}", context.borrow());
    println!("excludes: {:?}", excludes.borrow());

    ExitCode::SUCCESS
}
