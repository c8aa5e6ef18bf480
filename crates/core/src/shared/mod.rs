pub mod cancellation;
pub mod constants;
pub mod frame;
pub mod point;
pub mod region;
