pub mod export_handlers;
pub mod general_handlers;
pub mod proxy_handlers;
