// handlers/public/auth/mod.rs - Token acquisition

pub mod token; // POST /auth/token - exchange admin credentials for a token pair

pub use token::token_post;
