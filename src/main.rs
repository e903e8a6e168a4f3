use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match stroke_risk::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
