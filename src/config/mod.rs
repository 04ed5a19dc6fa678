//! Configuration module

mod site;

pub use site::DateSettings;
pub use site::Labels;
pub use site::SiteConfig;
