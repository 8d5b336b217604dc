// Model modules
pub mod billing;
pub mod digest;
pub mod quota;
