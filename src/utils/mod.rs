pub mod clock;
pub mod error;
pub mod logging;
pub mod string_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::*;
pub use string_utils::mask_token;
