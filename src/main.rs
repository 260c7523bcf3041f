use std::io;
use std::{env, process};

use glox::glox;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut glox = glox::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: glox [script]");
            process::exit(64);
        },
        2 => glox.run_file(args[1].clone()),
        _ => glox.run_prompt(),
    };
}
