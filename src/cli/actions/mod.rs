mod run;

use crate::check::{CheckOutcome, Config};

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Check { config: Config },
}

impl Action {
    /// Execute the action
    ///
    /// Failures are part of the returned outcome, never an error.
    pub async fn execute(self) -> CheckOutcome {
        run::execute(self).await
    }
}
