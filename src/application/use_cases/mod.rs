pub mod payment;
pub mod subscription;
