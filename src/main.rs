use std::env;
use std::process;

use aco_tsp::AcoConfig;

fn main() {
    let config = AcoConfig::build(env::args()).unwrap_or_else(|err| {
        println!("Problem parsing arguments: {err}");
        process::exit(1);
    });

    if let Err(e) = aco_tsp::run(&config) {
        println!("Application error: {e}");
        process::exit(1);
    };
}
