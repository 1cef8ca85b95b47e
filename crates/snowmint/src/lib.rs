#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(feature = "chrono")]
pub mod datetime;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
mod mono_clock;
mod mutex;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::mono_clock::*;
pub use crate::time::*;
