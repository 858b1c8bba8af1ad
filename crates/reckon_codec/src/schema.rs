//! The per-type field schema contract.

use crate::error::CodecResult;
use crate::field::FieldReader;
use crate::mask::ChangedMask;

/// Field schema contract for a replicated type.
///
/// Implementations map each assigned field index to that field's
/// comparison, copy, and codec operations. Do not implement this by
/// hand; declare the schema with [`diff_schema!`](crate::diff_schema)
/// and let the macro derive a type-checked implementation.
///
/// Unassigned indices are ignored by every operation: they compare
/// equal, copy nothing, and encode nothing.
pub trait DiffSchema: Clone + Default {
    /// Mask with a bit set for every assigned field index.
    const ASSIGNED: ChangedMask;

    /// Compares against `old` field by field and returns the mask of
    /// fields that differ under their equality rules.
    fn changed_since(&self, old: &Self) -> ChangedMask;

    /// Copies field `index` from `src` into `self`.
    fn copy_field(&mut self, index: u32, src: &Self);

    /// Appends field `index`'s canonical encoding to `buf`.
    fn encode_field(&self, index: u32, buf: &mut Vec<u8>) -> CodecResult<()>;

    /// Decodes field `index` from `reader` into `self`.
    fn decode_field(&mut self, index: u32, reader: &mut FieldReader<'_>) -> CodecResult<()>;
}

/// Declares the field schema of a replicated type.
///
/// Each entry pairs a stable index in `[0, 32)` with a named field of
/// the struct. Struct fields not listed here are excluded from diffing
/// entirely; index gaps are legal and stay reserved.
///
/// ```
/// use reckon_codec::diff_schema;
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Beacon {
///     callsign: String,
///     strength: f64,
///     uptime_secs: u64, // not replicated
/// }
///
/// diff_schema!(Beacon {
///     0 => callsign,
///     1 => strength,
/// });
/// ```
#[macro_export]
macro_rules! diff_schema {
    ($ty:ty { $($index:literal => $field:ident),+ $(,)? }) => {
        impl $crate::DiffSchema for $ty {
            const ASSIGNED: $crate::ChangedMask =
                $crate::ChangedMask::from_bits($((1u32 << $index))|+);

            fn changed_since(&self, old: &Self) -> $crate::ChangedMask {
                let mut mask = $crate::ChangedMask::NONE;
                $(
                    if !$crate::ApproxEq::approx_eq(&self.$field, &old.$field) {
                        mask = mask.with($index);
                    }
                )+
                mask
            }

            fn copy_field(&mut self, index: u32, src: &Self) {
                match index {
                    $($index => self.$field = src.$field.clone(),)+
                    _ => {}
                }
            }

            fn encode_field(
                &self,
                index: u32,
                buf: &mut Vec<u8>,
            ) -> $crate::CodecResult<()> {
                match index {
                    $($index => $crate::FieldCodec::encode(&self.$field, buf),)+
                    _ => Ok(()),
                }
            }

            fn decode_field(
                &mut self,
                index: u32,
                reader: &mut $crate::FieldReader<'_>,
            ) -> $crate::CodecResult<()> {
                match index {
                    $(
                        $index => {
                            self.$field = $crate::FieldCodec::decode(reader)?;
                            Ok(())
                        }
                    )+
                    _ => Ok(()),
                }
            }
        }
    };
}
