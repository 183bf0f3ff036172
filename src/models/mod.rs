pub mod gemini;
pub mod payment;
pub mod telegram;

pub use gemini::*;
pub use payment::*;
pub use telegram::*;
