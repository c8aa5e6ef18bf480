pub mod click_delay;
pub mod click_dispatcher;
pub mod pointer;
