fn main() {
    if let Err(err) = labeladjust::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
