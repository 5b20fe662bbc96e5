//! State machine module root.

pub mod machine;
