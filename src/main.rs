// Copyright (C) 2018 Red Hat, Inc.
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

extern crate clap;
extern crate env_logger;
extern crate stratis_cli;

use std::io;
use std::process;

use clap::Parser;
use stratis_cli::cli::{run, Cli};
use stratis_cli::{Client, StratisError};

fn main() -> Result<(), StratisError> {
    env_logger::init();

    let cli = Cli::parse();
    let propagate = cli.propagate;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = Client::connect()
        .and_then(|mut c| run(&mut c, cli.command, &mut out));

    match result {
        Ok(()) => Ok(()),
        Err(e) if propagate => Err(e),
        Err(e) => {
            eprintln!("Execution failed:\n{}", e);
            process::exit(1);
        }
    }
}
