// Auth passthrough: token verification and account emails are delegated to the
// identity provider; only the user profile mirror lives in our database.

pub mod handlers;
pub mod identity;
pub mod store;
