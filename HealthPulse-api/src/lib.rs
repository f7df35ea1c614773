// HealthPulse-api lib.rs
//
// HTTP surface for the HealthPulse metric engine: routes, handlers,
// boundary entities and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
