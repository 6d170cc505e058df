pub mod backend;
pub mod console;
pub mod platform;

pub use backend::Backend;
pub use console::{Console, Region};
pub use platform::PushPlatform;
