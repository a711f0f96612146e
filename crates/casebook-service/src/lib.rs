pub mod case_record;
pub mod document;
pub mod error;
pub mod lifecycle;
pub mod referral;
pub mod thread;
