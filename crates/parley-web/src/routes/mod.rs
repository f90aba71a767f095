mod chat;
mod health;

pub use chat::{chat_routes, QueryRequest, QueryResponse};
pub use health::health_routes;
