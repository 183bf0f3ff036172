pub mod gemini;
pub mod supabase;
pub mod telegram;
pub mod yookassa;

pub use gemini::*;
pub use supabase::*;
pub use telegram::*;
pub use yookassa::*;
