//! Session state shared by every front end

pub mod session;

pub use session::Session;
