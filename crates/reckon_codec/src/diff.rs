//! Diff creation, application, and wire serialization.

use bytes::BufMut;

use crate::error::{CodecError, CodecResult};
use crate::field::FieldReader;
use crate::mask::ChangedMask;
use crate::schema::DiffSchema;

/// A field-level diff between two values of a schema type.
///
/// The payload is the complete new value; only fields whose mask bit is
/// set are meaningful to [`apply`](Self::apply) and present on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    changed: ChangedMask,
    value: T,
}

impl<T: DiffSchema> Diff<T> {
    /// Creates a full-snapshot diff of `value`.
    ///
    /// Used the first time an entity is observed, when there is no prior
    /// value to diff against.
    pub fn snapshot(value: T) -> Self {
        Self {
            changed: ChangedMask::FULL,
            value,
        }
    }

    /// Computes the diff that brings `old` up to `new`.
    ///
    /// With no `old` value this is a full snapshot. Otherwise each
    /// schema field is compared under its equality rule, in index order.
    pub fn between(old: Option<&T>, new: T) -> Self {
        match old {
            None => Self::snapshot(new),
            Some(old) => Self {
                changed: new.changed_since(old),
                value: new,
            },
        }
    }

    /// The changed-field mask.
    #[must_use]
    pub fn changed(&self) -> ChangedMask {
        self.changed
    }

    /// The carried payload value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns true when this diff changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    /// Copies every changed field onto `target`.
    ///
    /// An empty mask returns `false` without touching `target` at all.
    /// Fields whose bit is clear are left as they were.
    pub fn apply(&self, target: &mut T) -> bool {
        if self.changed.is_empty() {
            return false;
        }
        for index in (self.changed & T::ASSIGNED).indices() {
            target.copy_field(index, &self.value);
        }
        true
    }

    /// Appends the wire encoding to `buf`.
    ///
    /// Layout: the mask as a network-order `u32`, then every set field
    /// in ascending index order in its canonical encoding.
    pub fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.put_u32(self.changed.bits());
        for index in (self.changed & T::ASSIGNED).indices() {
            self.value.encode_field(index, buf)?;
        }
        Ok(())
    }

    /// Decodes a diff from `reader`.
    ///
    /// The full-snapshot mask is accepted as-is. Any other mask with a
    /// bit outside the schema's assigned set marks a corrupt payload and
    /// is rejected with [`CodecError::Schema`].
    pub fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        let mask = ChangedMask::from_bits(reader.read_u32()?);
        if !mask.is_full() && (mask.bits() & !T::ASSIGNED.bits()) != 0 {
            return Err(CodecError::Schema {
                mask: mask.bits(),
                assigned: T::ASSIGNED.bits(),
            });
        }

        let mut value = T::default();
        for index in (mask & T::ASSIGNED).indices() {
            value.decode_field(index, reader)?;
        }
        Ok(Self {
            changed: mask,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff_schema;
    use crate::value::Vec3d;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Craft {
        name: String,
        position: Vec3d,
        crew: u32,
    }

    diff_schema!(Craft {
        0 => name,
        1 => position,
        3 => crew,
    });

    fn craft(name: &str, x: f64, crew: u32) -> Craft {
        Craft {
            name: name.into(),
            position: Vec3d::new(x, 0.0, 0.0),
            crew,
        }
    }

    #[test]
    fn equal_values_diff_to_empty_mask() {
        let a = craft("Auriga", 1.0, 3);
        let diff = Diff::between(Some(&a), a.clone());
        assert!(diff.is_noop());
    }

    #[test]
    fn missing_old_value_is_a_full_snapshot() {
        let diff = Diff::between(None, craft("Auriga", 1.0, 3));
        assert!(diff.changed().is_full());
    }

    #[test]
    fn apply_brings_old_up_to_new() {
        let a = craft("Auriga", 0.0, 3);
        let b = craft("Auriga", 1.0, 3);
        let diff = Diff::between(Some(&a), b.clone());
        assert_eq!(diff.changed().bits(), 0b10);

        let mut target = a;
        assert!(diff.apply(&mut target));
        assert_eq!(target, b);

        // Applying again changes nothing further.
        assert!(diff.apply(&mut target));
        assert_eq!(target, b);
    }

    #[test]
    fn noop_apply_leaves_target_untouched() {
        let a = craft("Auriga", 0.0, 3);
        let diff = Diff::between(Some(&a), a.clone());

        let mut target = craft("Borealis", 9.0, 1);
        assert!(!diff.apply(&mut target));
        assert_eq!(target, craft("Borealis", 9.0, 1));
    }

    #[test]
    fn snapshot_apply_replaces_every_schema_field() {
        let snap = Diff::snapshot(craft("Auriga", 4.0, 2));
        let mut target = craft("Borealis", -1.0, 9);
        assert!(snap.apply(&mut target));
        assert_eq!(target, craft("Auriga", 4.0, 2));
    }

    #[test]
    fn wire_roundtrip_partial() {
        let a = craft("Auriga", 0.0, 3);
        let b = craft("Auriga", 2.0, 4);
        let diff = Diff::between(Some(&a), b.clone());

        let mut buf = Vec::new();
        diff.encode(&mut buf).unwrap();

        let mut reader = FieldReader::new(&buf);
        let decoded = Diff::<Craft>::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded.changed(), diff.changed());

        let mut target = a;
        decoded.apply(&mut target);
        assert_eq!(target, b);
    }

    #[test]
    fn wire_roundtrip_snapshot() {
        let snap = Diff::snapshot(craft("Auriga", 4.0, 2));
        let mut buf = Vec::new();
        snap.encode(&mut buf).unwrap();

        let mut reader = FieldReader::new(&buf);
        let decoded = Diff::<Craft>::decode(&mut reader).unwrap();
        assert!(decoded.changed().is_full());

        let mut target = Craft::default();
        decoded.apply(&mut target);
        assert_eq!(target, craft("Auriga", 4.0, 2));
    }

    #[test]
    fn unassigned_mask_bit_is_rejected() {
        // Bit 2 is a schema gap; bit 5 is beyond the last field.
        for bits in [0b100u32, 0b10_0000] {
            let mut buf = Vec::new();
            buf.extend_from_slice(&bits.to_be_bytes());
            let mut reader = FieldReader::new(&buf);
            let err = Diff::<Craft>::decode(&mut reader).unwrap_err();
            assert!(matches!(err, CodecError::Schema { .. }));
        }
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let a = craft("Auriga", 0.0, 3);
        let b = craft("Borealis", 1.0, 3);
        let diff = Diff::between(Some(&a), b);

        let mut buf = Vec::new();
        diff.encode(&mut buf).unwrap();
        buf.truncate(buf.len() - 1);

        let mut reader = FieldReader::new(&buf);
        assert!(matches!(
            Diff::<Craft>::decode(&mut reader),
            Err(CodecError::UnexpectedEnd { .. })
        ));
    }
}
