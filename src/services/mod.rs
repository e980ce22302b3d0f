pub mod cli_discovery;
pub mod command_builder;

pub use cli_discovery::{default_search_dirs, CandidateSource, CliDiscovery, DiscoveredCli};
pub use command_builder::{base_command, build_command, build_session_command, tokenize_cli_path};
