use goin_repl::{config::ReplConfig, init_tracing, repl::repl};

fn main() {
    init_tracing();

    let config = ReplConfig::from_env();
    if let Err(err) = repl(config) {
        eprintln!("goin: {}", err);
        std::process::exit(1);
    }
}
