//! 终端输出

mod cli;

pub use cli::{print_error, print_observation, print_reports, print_resolved, print_stale, ResolvedRow};
