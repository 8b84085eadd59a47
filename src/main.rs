fn main() {
    if let Err(err) = memviz_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
