use std::process::ExitCode;

use benchdiff::cli::{self, Outcome};
use benchdiff::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::CheckFailed) => ExitCode::from(1),
        Err(err) => {
            output::error(format_args!("{:#}", err));
            ExitCode::from(1)
        }
    }
}
