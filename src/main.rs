use core_analysis::ChromaKeyEstimator;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let estimator = ChromaKeyEstimator::default();
    let code = keyfinder_cli::run(
        std::env::args_os(),
        &estimator,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    ExitCode::from(code)
}
