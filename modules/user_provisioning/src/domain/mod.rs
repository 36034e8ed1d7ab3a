pub mod bulk;
pub mod error;
pub mod form;
pub mod naming;
pub mod ports;
pub mod resolver;
pub mod service;
