pub mod bullets;
pub mod constants;
pub mod math;
pub mod room;
pub mod snake;
pub mod spawn;
pub mod types;
pub mod zone;
