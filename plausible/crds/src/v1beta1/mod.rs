mod custom_property;
mod goal;
mod guest;
mod provider_config;
mod shared_link;
mod site;
mod team;

pub use custom_property::*;
pub use goal::*;
pub use guest::*;
pub use provider_config::*;
pub use shared_link::*;
pub use site::*;
pub use team::*;
