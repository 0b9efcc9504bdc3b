use std::process::ExitCode;

fn main() -> ExitCode {
    buddy_cli::run()
}
