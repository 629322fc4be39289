pub mod activate;
pub mod monitor;
pub mod preflight;
pub mod window;
