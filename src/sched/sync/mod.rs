//! Primitivas de espera que dependem do scheduler.

pub mod waitqueue;

pub use waitqueue::WaitQueue;
