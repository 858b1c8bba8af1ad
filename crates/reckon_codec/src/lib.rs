//! # Reckon Codec
//!
//! Field-level diff engine and canonical binary codec.
//!
//! This crate provides:
//! - `ChangedMask` for tracking which schema fields differ
//! - `Diff` for creating, applying, and (de)serializing field-level diffs
//! - `DiffSchema`, the per-type field schema contract
//! - `diff_schema!`, a declarative macro deriving the contract at
//!   compile time
//! - `ApproxEq`, the per-type equality rules used when diffing
//! - Canonical network-order field encodings via `FieldCodec`
//!
//! ## Schema model
//!
//! A replicated type declares an ordered set of fields, each with a
//! stable index in `[0, 32)`. Bit `i` of a diff's changed-mask is set
//! when field `i` differs between two values. Fields without an index
//! never participate in equality, apply, or serialization. A mask of
//! zero is the well-defined "no change" diff; a mask of all ones marks
//! a full snapshot.
//!
//! ## Usage
//!
//! ```
//! use reckon_codec::{diff_schema, Diff};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Probe {
//!     label: String,
//!     fuel: f64,
//! }
//!
//! diff_schema!(Probe {
//!     0 => label,
//!     1 => fuel,
//! });
//!
//! let a = Probe { label: "one".into(), fuel: 1.0 };
//! let b = Probe { label: "one".into(), fuel: 2.0 };
//!
//! let diff = Diff::between(Some(&a), b.clone());
//! assert_eq!(diff.changed().bits(), 0b10);
//!
//! let mut target = a;
//! assert!(diff.apply(&mut target));
//! assert_eq!(target, b);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod approx;
mod diff;
mod error;
mod field;
mod mask;
mod schema;
mod value;

pub use approx::ApproxEq;
pub use diff::Diff;
pub use error::{CodecError, CodecResult};
pub use field::{FieldCodec, FieldReader, MAX_STRING_FIELD_LEN};
pub use mask::ChangedMask;
pub use schema::DiffSchema;
pub use value::{Quat, Vec3, Vec3d};
