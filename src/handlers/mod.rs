pub mod gemini;
pub mod payment;
pub mod telegram;
pub mod webhook;

pub use gemini::gemini_config;
pub use payment::payment_config;
pub use telegram::telegram_config;
pub use webhook::webhook_config;
