pub mod common;
pub mod completions;
pub mod delete;
pub mod done;
pub mod edit;
pub mod list;
pub mod new;
pub mod rename;
pub mod sync;
pub mod view;
