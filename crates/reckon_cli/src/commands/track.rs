//! The `track` subcommand: a demo client flying synthetic vessels.

use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use reckon_codec::{Quat, Vec3, Vec3d};
use reckon_core::VesselId;
use reckon_net::{ClientConfig, Connection, NetResult, VesselTracker};
use reckon_protocol::VesselStatus;
use tracing::info;

/// Connects to a server and replicates a small fleet of synthetic
/// vessels flying circular paths.
pub fn run(server: SocketAddr, vessels: usize, ticks: u64, interval_ms: u64) -> NetResult<()> {
    let config = ClientConfig::new(server);
    let connection = Connection::connect(&config)?;
    info!(%server, vessels, "tracking");
    // First contact creates our session server-side, so relays for
    // other peers' vessels start flowing even if we never send one.
    connection.send_debug("tracker online")?;
    let mut tracker = VesselTracker::new(connection, &config);

    let fleet: Vec<(VesselId, String)> = (0..vessels)
        .map(|lane| (VesselId::new(), format!("Demo-{}", lane + 1)))
        .collect();

    let mut tick: u64 = 0;
    loop {
        if ticks != 0 && tick >= ticks {
            break;
        }

        let elapsed = tick as f64 * interval_ms as f64 / 1000.0;
        let snapshots: Vec<(VesselId, VesselStatus)> = fleet
            .iter()
            .enumerate()
            .map(|(lane, (id, name))| (*id, synthetic_status(name, lane as f64, elapsed)))
            .collect();

        tracker.update(&snapshots)?;
        tracker.pump()?;

        thread::sleep(Duration::from_millis(interval_ms));
        tick += 1;
    }

    info!(ticks = tick, "demo finished");
    tracker.close();
    Ok(())
}

fn synthetic_status(name: &str, lane: f64, elapsed: f64) -> VesselStatus {
    let radius = 100.0 + lane * 25.0;
    let angular_rate = 0.2;
    let angle = elapsed * angular_rate;

    VesselStatus {
        name: name.into(),
        planet_time: elapsed,
        body_name: "Kerbin".into(),
        rotation: Quat::IDENTITY,
        angular_velocity: Vec3::new(0.0, angular_rate as f32, 0.0),
        position: Vec3d::new(radius * angle.cos(), 500.0 + lane, radius * angle.sin()),
        velocity: Vec3d::new(
            -radius * angular_rate * angle.sin(),
            0.0,
            radius * angular_rate * angle.cos(),
        ),
        acceleration: Vec3d::default(),
        terrain_normal: Vec3::new(0.0, 1.0, 0.0),
    }
}
