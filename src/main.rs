use std::process::ExitCode;

fn main() -> ExitCode {
    claimback_lib::run()
}
