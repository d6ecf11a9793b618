pub mod grid;
pub mod marquee;
pub mod picking;
