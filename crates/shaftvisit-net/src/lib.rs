//! # shaftvisit-net
//!
//! Network layer: reachability reporting and the HTTPS write contract
//! against the visit-management backend.

pub mod connectivity;
pub mod gateway;

mod error;

pub use connectivity::{Connectivity, NetworkState, SharedConnectivity};
pub use error::GatewayError;
pub use gateway::{
    DetailPayload, EnrollmentPayload, GatewayConfig, HeaderPayload, HttpGateway, VisitGateway,
};
