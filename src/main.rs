fn main() {
    if let Err(err) = query_insights::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
