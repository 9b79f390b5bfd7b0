pub mod intent;
pub mod task;
