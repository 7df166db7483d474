fn main() {
    if let Err(e) = comp_overlay_lib::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
