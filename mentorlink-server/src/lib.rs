pub mod http;
pub mod routes;
