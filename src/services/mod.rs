pub mod commission_service;
pub mod request_service;

pub use commission_service::{CommissionError, CommissionInput, CommissionService};
pub use request_service::{CreateRequest, RequestError, RequestService};
