pub mod handlers;
pub mod middleware;
pub mod organizer;
pub mod pending;
pub mod registry;
pub mod routes;

pub use routes::create_router;
