#![no_std]

pub mod accounting;
pub mod full_math;
pub mod rate;
pub mod ratio;

pub use accounting::{
    accrue_fee, close, credit_exercise, debit_exercise, exercise, mint, redeem, RedeemPayout,
};
pub use full_math::{add, mul_div_ceil, mul_div_floor, sub};
pub use rate::{to_real, to_wrapped_ceil, to_wrapped_floor};
pub use ratio::{flash_fee, pro_rata, strike_for};
