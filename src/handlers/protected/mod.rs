// handlers/protected/mod.rs - Handlers behind a bearer token
//
// Every handler here can rely on the guard having verified the caller; use
// the `Caller` extractor to read the verified token payload.

pub mod auth;
pub mod files;
pub mod libraries;
