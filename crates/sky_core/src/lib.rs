pub mod input;
pub mod time;

pub use input::{InputState, Key};
pub use time::{TimeState, FIXED_DT_US};
