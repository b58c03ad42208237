mod teamcity;

pub use teamcity::{CollectOptions, TeamCityProvider};
