fn main() {
    let options = match sift_core::runtime::parse_cli_args(std::env::args_os()) {
        Ok(options) => options,
        Err(error) => error.exit(),
    };

    let config = match sift_core::runtime::load_config(&options) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("[sift] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = sift_core::runtime::run_with_options(options, config) {
        log::error!("runtime failed: {error}");
        eprintln!("[sift] runtime failed: {error}");
        std::process::exit(1);
    }
}
