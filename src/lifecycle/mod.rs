//! Stochastic lifecycle simulation with a persisted process table.

pub mod config;
pub mod reconcile;
pub mod runner;

pub use config::{SimConfig, DEFAULT_P_IO, DEFAULT_P_UNBLOCK, DEFAULT_QUANTUM, DEFAULT_WORKLOADS};
pub use reconcile::{reconcile, Reconciled};
pub use runner::{LifecycleSimulator, SimReport};
