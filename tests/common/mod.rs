#![allow(dead_code)]

pub use when_changed_test_utils::builders;
pub use when_changed_test_utils::{dir_event, file_event, init_tracing, with_timeout};
