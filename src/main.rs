use std::process::ExitCode;

fn main() -> ExitCode {
    match refugeally::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("refugeally: {e}");
            ExitCode::FAILURE
        }
    }
}
