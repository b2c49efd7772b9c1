// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! `wick` - reads a `.wk` source file, parses it, and evaluates it,
//! printing the program's result (or its error) to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use structopt::StructOpt;

use wick_lang::parser::Parser;
use wick_lang::value::Value;
use wick_lang::writer::StdoutWriter;
use wick_lang::Evaluator;

#[derive(Debug, StructOpt)]
#[structopt(name = "wick", about = "Run a Wick script")]
struct Opt {
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,

    /// The source file to run.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
}

fn main() -> ExitCode {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        log::Level::Trace
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level).unwrap();

    let source = match std::fs::read_to_string(&opt.source) {
        Ok(s) => s,
        Err(e) => {
            log::error!("could not read {}: {}", opt.source.display(), e);
            return ExitCode::FAILURE;
        }
    };

    log::trace!("parsing {}", opt.source.display());
    let program = match Parser::parse_program(&source) {
        Ok(program) => program,
        Err(e) => {
            log::error!("parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::trace!("evaluating {}", opt.source.display());
    let mut evaluator = Evaluator::new();
    let mut writer = StdoutWriter;
    match evaluator.eval_program(&program, &mut writer) {
        Value::Error(msg) => {
            log::error!("{}", msg);
            ExitCode::FAILURE
        }
        Value::Nil => ExitCode::SUCCESS,
        other => {
            println!("{}", other);
            ExitCode::SUCCESS
        }
    }
}
