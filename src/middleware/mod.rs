pub mod admin_ctx;

pub use admin_ctx::{AdminGate, AdminIdentity, TokenGate};
