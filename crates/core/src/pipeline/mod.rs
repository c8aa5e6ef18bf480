pub mod pipeline_logger;
pub mod process_and_click_use_case;
