// Authentication: Argon2 password hashing, JWT access/refresh tokens,
// the bearer-token middleware and the /api/auth handlers.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod tokens;
pub mod validation;
