use super::Action;
use crate::check::{self, CheckOutcome};

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> CheckOutcome {
    match action {
        Action::Check { config } => check::run(&config).await,
    }
}
