use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;

use paracl::diag::Reporter;
use paracl::driver::compile;

/// ParaCL interpreter.
#[derive(Parser)]
#[command(name = "paracl", about = "ParaCL interpreter", version)]
struct Cli {
    /// Path to the ParaCL source file.
    file: PathBuf,
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let requested = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = err.print();
            return if requested { 0 } else { 1 };
        }
    };

    let file = cli.file.display().to_string();
    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: Error: {}.", file, err);
            return 1;
        }
    };

    let reporter = Reporter::new(&file, &source);
    let mut program = match compile(&source) {
        Ok(program) => program,
        Err(err) => {
            let _ = reporter.report(&mut io::stderr(), &err);
            return 1;
        }
    };

    #[cfg(feature = "ast-dump")]
    if let Err(err) = write_dumps(&program) {
        eprintln!("{}: Error: {}.", file, err);
        return 1;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = program.execute(stdin.lock(), stdout.lock());
    let _ = io::stdout().flush();

    match result {
        Ok(()) => 0,
        Err(err) => {
            let _ = reporter.report(&mut io::stderr(), &err);
            1
        }
    }
}

/// Debug side channel: the AST as DOT and the symbol table as text,
/// written next to the working directory like the original tool did.
#[cfg(feature = "ast-dump")]
fn write_dumps(program: &paracl::driver::CompiledProgram) -> io::Result<()> {
    let mut ast_file = fs::File::create("AST_dump")?;
    paracl::dump::dump_ast(&program.ast, &mut ast_file)?;
    let mut st_file = fs::File::create("ST_dump")?;
    paracl::dump::dump_symbols(&program.symtab, &mut st_file)
}
