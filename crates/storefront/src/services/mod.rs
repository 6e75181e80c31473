//! External service clients: payment gateway and transactional email.

pub mod mailer;
pub mod paymob;

pub use mailer::EmailService;
pub use paymob::PaymobClient;
