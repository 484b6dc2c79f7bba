/**
 * Authentication
 *
 * User accounts, bearer-token sessions, and the signup/login handlers.
 */

pub mod handlers;
pub mod sessions;
pub mod users;

pub use handlers::{login, signup};
