// User accounts and profiles: persistence, partial profile updates and the
// /api/users handlers (self-service plus admin listing).

pub mod handlers;
pub mod profile;
pub mod store;
