//! Reverse-proxy core: every `/api` route is a [`RouteSpec`] served by the
//! single [`forward`] function.

pub mod forward;
pub mod headers;
pub mod route_table;
pub mod upstream;

pub use forward::{ forward, InboundRequest, ProxyResponse };
pub use route_table::{ routes, staff_defaulters, BodyPolicy, QueryPolicy, ResponseShape, RouteSpec };
pub use upstream::UpstreamClient;
