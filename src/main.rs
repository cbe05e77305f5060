use std::process;

fn main() {
    if let Err(e) = stela::cli::run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
