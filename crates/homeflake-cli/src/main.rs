mod cli;
mod logging;
mod output;
mod pipeline;
mod tui;

fn main() -> std::process::ExitCode {
    cli::run()
}
