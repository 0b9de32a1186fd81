fn main() {
    if let Err(err) = pingcheck_lib::run() {
        eprintln!("pingcheck: {err:#}");
        std::process::exit(1);
    }
}
