//! An order-4 PPM character model used as a language oracle.
//!
//! Nothing is ever compressed. The model only answers how surprising a piece
//! of text is, in nats, so that cipher solvers can rank candidate plaintexts:
//!
//! ```
//! use cribscore_core::Model;
//!
//! let mut model = Model::new("abcdefghijklmnopqrstuvwxyz ", false).unwrap();
//! model.train_bytes(b"the cat sat on the mat");
//! assert!(model.score("the mat") < model.score("xqz jvk"));
//! ```
//!
//! Memory is fixed when the model is built: one `u32` counter for every
//! (context, symbol) pair, `size^5` in all, where `size` is the alphabet
//! length plus one rounded up to a power of two. Counters are halved when one
//! of them would overflow.

pub mod alphabet;
pub mod context;
pub mod counts;
pub mod error;
pub mod estimator;
pub mod metadata;
pub mod model;
#[cfg(feature = "persist")]
pub mod persist;

pub use alphabet::Alphabet;
pub use context::ORDER;
pub use error::{ConstructionError, Error};
pub use metadata::Metadata;
pub use model::{Model, ModelOptions};
