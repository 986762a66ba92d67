/*
[INPUT]:  Backend schema and handshake data
[OUTPUT]: Typed request/response and domain structs
[POS]:    Data layer - type definitions for backend communication
[UPDATE]: When backend schema changes or new types added
*/

pub mod models;
pub mod requests;
pub mod responses;

pub use models::*;
pub use requests::*;
pub use responses::*;
