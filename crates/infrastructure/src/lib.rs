pub mod kanctl;
pub mod kubernetes;
pub mod metrics;
