use basalt::engine::uci::Uci;

fn main() {
    // Diagnostics go to stderr so stdout stays a clean protocol stream.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    Uci::new().uci_loop();
}
