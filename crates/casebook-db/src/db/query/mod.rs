pub mod bank;
pub mod case;
pub mod custom_field;
pub mod document;
pub mod referral;
pub mod thread;
pub mod timeline;
