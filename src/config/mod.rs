//! Configuration module

mod site;

pub use site::ApiConfig;
pub use site::FallbackMode;
pub use site::SiteConfig;
