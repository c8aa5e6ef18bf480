pub mod dry_run_pointer;
