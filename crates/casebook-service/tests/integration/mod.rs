pub mod helpers;

mod case_crud;
mod documents;
mod lifecycle;
mod referral_counter;
mod threads;
