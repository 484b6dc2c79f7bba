/**
 * promptforge
 *
 * An AI generation service: HTTP endpoints that turn prompts into
 * images, code files, documents, presentations, and speech artifacts,
 * with JWT-authenticated users and subscription billing.
 */

pub mod artifacts;
pub mod auth;
pub mod billing;
pub mod builders;
pub mod content;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod subscription;
pub mod tools;
