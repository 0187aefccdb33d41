//! Swap domain - form state driven by the user

mod swap_form;

pub use swap_form::{Side, SwapAction, SwapForm};
