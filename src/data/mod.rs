pub mod loader;
pub mod record;
pub mod split;
pub mod window;
