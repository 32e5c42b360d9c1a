pub mod abuse_api;
pub mod cart_api;
pub mod catalog_api;
pub mod checkout_flow_api;
pub mod checkout_objects;
pub mod sales_api;
