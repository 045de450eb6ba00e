pub mod check;
pub mod cli;
pub mod metrics;
pub mod size;
pub mod tls;
