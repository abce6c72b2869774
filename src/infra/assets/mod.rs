pub mod static_assets;

pub use static_assets::*;
