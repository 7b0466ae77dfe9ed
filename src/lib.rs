pub mod config;
pub mod profile;
pub mod store;
pub mod best;
pub mod density;
pub mod residuals;
pub mod modes;
pub mod plot;
pub mod export;
