//! Mini CLI: compile and run an expression program.

use std::env;
use std::fs;
use std::io::Read;
use std::process;

use colored::Colorize;

use minilang::error::MinilangError;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Exit codes, sysexits-style: usage, data (lex/parse), software (compile),
// internal software error (runtime).
const EXIT_USAGE: i32 = 64;
const EXIT_PARSE: i32 = 65;
const EXIT_COMPILE: i32 = 66;
const EXIT_RUNTIME: i32 = 70;

/// Program source to execute.
enum Input {
    /// Read a file
    File(String),
    /// Inline code from -e
    Inline(String),
    /// Read stdin until end-of-stream
    Stdin,
}

/// CLI options parsed from arguments.
struct Options {
    input: Input,
    dump_ast: bool,
    disassemble: bool,
}

fn print_usage() {
    eprintln!("Mini {} - Minilang expression compiler and VM", VERSION);
    eprintln!();
    eprintln!("Usage: mini [options] [file]");
    eprintln!();
    eprintln!("Reads the program from <file>, or from stdin when no file is given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>       Evaluate code given on the command line");
    eprintln!("  --dump-ast      Print the AST and stop (no execution)");
    eprintln!("  --disassemble   Print the bytecode listing before running");
    eprintln!("  --help, -h      Show this help message");
}

fn parse_args() -> Options {
    let mut args = env::args().skip(1);
    let mut input = None;
    let mut dump_ast = false;
    let mut disassemble = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--dump-ast" => dump_ast = true,
            "--disassemble" => disassemble = true,
            "-e" => {
                let Some(code) = args.next() else {
                    eprintln!("{}", "Error: -e requires an argument".red());
                    process::exit(EXIT_USAGE);
                };
                input = Some(Input::Inline(code));
            }
            _ if arg.starts_with('-') => {
                eprintln!("{}", format!("Error: unknown option '{}'", arg).red());
                print_usage();
                process::exit(EXIT_USAGE);
            }
            _ => {
                if input.is_some() {
                    eprintln!("{}", "Error: multiple inputs given".red());
                    process::exit(EXIT_USAGE);
                }
                input = Some(Input::File(arg));
            }
        }
    }

    Options {
        input: input.unwrap_or(Input::Stdin),
        dump_ast,
        disassemble,
    }
}

fn read_source(input: &Input) -> String {
    match input {
        Input::Inline(code) => code.clone(),
        Input::File(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("{}", format!("Error: cannot read '{}': {}", path, e).red());
            process::exit(EXIT_USAGE);
        }),
        Input::Stdin => {
            let mut source = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut source) {
                eprintln!("{}", format!("Error: cannot read stdin: {}", e).red());
                process::exit(EXIT_USAGE);
            }
            source
        }
    }
}

fn exit_code(error: &MinilangError) -> i32 {
    match error {
        MinilangError::Lexer(_) | MinilangError::Parser(_) => EXIT_PARSE,
        MinilangError::Compile(_) => EXIT_COMPILE,
        MinilangError::Runtime(_) => EXIT_RUNTIME,
        MinilangError::Io(_) => EXIT_USAGE,
    }
}

fn run(options: &Options) -> Result<(), MinilangError> {
    let source = read_source(&options.input);

    let expr = minilang::parse(&source)?;
    println!("{}", expr.sexpr());

    if options.dump_ast {
        return Ok(());
    }

    let chunk = minilang::bytecode::Compiler::new().compile(&expr)?;

    if options.disassemble {
        print!("{}", minilang::bytecode::disassemble_chunk(&chunk));
        println!("---");
    }

    let result = minilang::bytecode::Vm::new().run(&chunk)?;
    println!("{}", result);

    Ok(())
}

fn main() {
    let options = parse_args();

    if let Err(e) = run(&options) {
        eprintln!("{}", e.to_string().red());
        process::exit(exit_code(&e));
    }
}
