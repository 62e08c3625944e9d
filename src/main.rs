fn main() -> Result<(), eframe::Error> {
    // Set up logging; RUST_LOG=card_canvas=debug shows gesture transitions
    env_logger::init();

    card_canvas::run_app()
}
