use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match anti_air::run_with_config().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("anti_air: {e}");
            ExitCode::FAILURE
        }
    }
}
