mod client;
mod last_run;
mod project_path;
mod provider;
mod types;


pub use provider::{CollectOptions, TeamCityProvider};
