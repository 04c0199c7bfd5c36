pub mod commission;
pub mod deal;
pub mod label;
pub mod lead;
pub mod phonebook;
pub mod request;
pub mod user;

pub use commission::{CommissionPayment, CommissionRecord};
pub use deal::Deal;
pub use label::Label;
pub use lead::Lead;
pub use phonebook::{PhonebookComment, PhonebookEntry, CALSTATUS_BLOCKED};
pub use request::{LeadRequest, LeadRequestWithSender, RequestAction};
pub use user::User;
