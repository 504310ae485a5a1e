use first_glow::SceneConfig;

fn main() -> std::process::ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    first_glow::app::exit_code(first_glow::app::run(SceneConfig::quad()))
}
