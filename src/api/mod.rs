pub mod invoker;
pub mod v1;
