use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match bideval_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", bideval_lib::config::APP_NAME);
            ExitCode::FAILURE
        }
    }
}
