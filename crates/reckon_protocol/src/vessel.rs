//! The replicated vessel snapshot and its field schema.

use reckon_codec::{diff_schema, Quat, Vec3, Vec3d};

/// Live state of one tracked vessel, sampled each tick by the host
/// simulation loop.
///
/// The field indices below are the wire schema and must stay stable.
/// Index 1 is unassigned and stays reserved. `planet_time` carries no
/// index on purpose: it changes every tick, and replicating it would
/// make every diff non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VesselStatus {
    /// Display name of the vessel.
    pub name: String,
    /// Universal time of the sample. Not replicated.
    pub planet_time: f64,
    /// Name of the celestial body the vessel is near.
    pub body_name: String,
    /// Surface-relative rotation.
    pub rotation: Quat,
    /// Angular velocity.
    pub angular_velocity: Vec3,
    /// Surface position.
    pub position: Vec3d,
    /// Surface-relative velocity.
    pub velocity: Vec3d,
    /// Acceleration.
    pub acceleration: Vec3d,
    /// Terrain normal under the vessel.
    pub terrain_normal: Vec3,
}

diff_schema!(VesselStatus {
    0 => name,
    2 => body_name,
    3 => rotation,
    4 => angular_velocity,
    5 => position,
    6 => velocity,
    7 => acceleration,
    8 => terrain_normal,
});

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_codec::{ChangedMask, Diff, DiffSchema};

    #[test]
    fn assigned_mask_skips_index_one() {
        assert_eq!(VesselStatus::ASSIGNED.bits(), 0b1_1111_1101);
    }

    #[test]
    fn planet_time_never_diffs() {
        let a = VesselStatus {
            planet_time: 100.0,
            ..VesselStatus::default()
        };
        let b = VesselStatus {
            planet_time: 200.0,
            ..VesselStatus::default()
        };
        assert!(b.changed_since(&a).is_empty());
    }

    #[test]
    fn moving_vessel_diffs_position_only() {
        let a = VesselStatus {
            name: "Auriga".into(),
            position: Vec3d::new(0.0, 0.0, 0.0),
            ..VesselStatus::default()
        };
        let b = VesselStatus {
            name: "Auriga".into(),
            position: Vec3d::new(1.0, 0.0, 0.0),
            ..VesselStatus::default()
        };
        let diff = Diff::between(Some(&a), b);
        assert_eq!(diff.changed(), ChangedMask::NONE.with(5));
    }
}
