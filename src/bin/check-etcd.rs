use check_etcd::{check::CheckState, cli};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match cli::start().await {
        Ok(outcome) => {
            println!("{}", outcome.message);
            outcome.state.into()
        }
        Err(e) => {
            println!("{e:#}");
            CheckState::Critical.into()
        }
    }
}
