pub mod record;
pub mod saved;
pub mod user;
