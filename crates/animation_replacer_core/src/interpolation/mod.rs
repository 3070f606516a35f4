pub mod easing;
pub mod linear;
