//! End-to-end replication over loopback UDP: one server, a sending
//! client, and an observing client.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use reckon_codec::{Diff, Vec3d};
use reckon_core::VesselId;
use reckon_net::{ClientConfig, Connection, Server, ServerConfig, ServerEvent, VesselTracker};
use reckon_protocol::{Frame, Message, MessageType, VesselStatus, HEADER_LEN};

struct ServerHarness {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    events: Arc<Mutex<Vec<ServerEvent>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ServerHarness {
    fn start(config: ServerConfig) -> Self {
        let mut server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let events = Arc::new(Mutex::new(Vec::new()));

        let handle = thread::spawn({
            let stop = Arc::clone(&stop);
            let events = Arc::clone(&events);
            move || {
                while !stop.load(Ordering::SeqCst) {
                    let new_events = server.step(Duration::from_millis(20));
                    events.lock().extend(new_events);
                }
                server.close();
            }
        });

        Self {
            addr,
            stop,
            events,
            handle: Some(handle),
        }
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        self.stop();
    }
}

fn test_config() -> ServerConfig {
    ServerConfig::new(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .with_idle_timeout(Duration::from_secs(60))
}

fn status(name: &str, x: f64) -> VesselStatus {
    VesselStatus {
        name: name.into(),
        body_name: "Kerbin".into(),
        position: Vec3d::new(x, 0.0, 0.0),
        ..VesselStatus::default()
    }
}

fn recv_update(connection: &Connection) -> Frame {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if let Some(frame) = connection.recv_timeout(Duration::from_millis(100)) {
            if matches!(frame.message, Message::VesselUpdate(_)) {
                return frame;
            }
        }
    }
    panic!("no vessel update arrived");
}

fn settle() {
    thread::sleep(Duration::from_millis(300));
}

// A full snapshot reaches a fresh observer; once the observer has
// acknowledged it, a later movement arrives as a position-only diff.
#[test]
fn snapshot_then_position_only_diff() {
    let mut harness = ServerHarness::start(test_config());

    // The observer makes contact first so the vessel registers it.
    let observer = Connection::connect(&ClientConfig::new(harness.addr)).unwrap();
    observer.send_debug("observer online").unwrap();
    settle();

    let sender_config = ClientConfig::new(harness.addr);
    let sender = Connection::connect(&sender_config).unwrap();
    let mut tracker = VesselTracker::new(sender, &sender_config);
    let vessel = VesselId::new();

    tracker.update(&[(vessel, status("Foo", 0.0))]).unwrap();

    // First relay: a full snapshot of a vessel we have never seen.
    let frame = recv_update(&observer);
    let Message::VesselUpdate(update) = &frame.message else {
        unreachable!();
    };
    assert_eq!(update.vessel, vessel);
    assert!(update.diff.changed().is_full());

    let mut local = VesselStatus::default();
    update.diff.apply(&mut local);
    assert_eq!(local.name, "Foo");
    assert_eq!(local.position, Vec3d::new(0.0, 0.0, 0.0));

    // Acknowledge so the server learns our watermark.
    observer
        .send_ack(MessageType::VesselUpdate, frame.sequence)
        .unwrap();
    settle();

    tracker.update(&[(vessel, status("Foo", 1.0))]).unwrap();

    // Second relay: only the position field moved.
    let frame = recv_update(&observer);
    let Message::VesselUpdate(update) = &frame.message else {
        unreachable!();
    };
    assert_eq!(update.diff.changed().bits(), 1 << 5);

    update.diff.apply(&mut local);
    assert_eq!(local.name, "Foo");
    assert_eq!(local.position, Vec3d::new(1.0, 0.0, 0.0));

    harness.stop();
}

// A VesselUpdate whose mask covers bits the schema does not assign is
// dropped without corrupting the rest of the server.
#[test]
fn malformed_update_does_not_poison_the_server() {
    let mut harness = ServerHarness::start(test_config());

    let observer = Connection::connect(&ClientConfig::new(harness.addr)).unwrap();
    observer.send_debug("observer online").unwrap();
    settle();

    // Hand-craft an update whose mask sets bit 9, past the last field.
    let poison_vessel = VesselId::new();
    let mut datagram = Frame::encode(
        &Message::vessel_update(poison_vessel, Diff::snapshot(status("Poison", 0.0))),
        0,
    )
    .unwrap();
    let mask_at = HEADER_LEN + 16;
    datagram[mask_at..mask_at + 4].copy_from_slice(&(1u32 << 9).to_be_bytes());
    datagram.truncate(mask_at + 4);

    let raw = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    raw.send_to(&datagram, harness.addr).unwrap();
    settle();

    // The server is still alive and routing valid traffic.
    let sender_config = ClientConfig::new(harness.addr);
    let sender = Connection::connect(&sender_config).unwrap();
    let mut tracker = VesselTracker::new(sender, &sender_config);
    let vessel = VesselId::new();
    tracker.update(&[(vessel, status("Survivor", 2.0))]).unwrap();

    let frame = recv_update(&observer);
    let Message::VesselUpdate(update) = &frame.message else {
        unreachable!();
    };
    assert_eq!(update.vessel, vessel);
    assert!(update.diff.changed().is_full());
    assert_eq!(update.diff.value().name, "Survivor");

    harness.stop();
}

// A tracker on the observing side reconstructs remote vessels from the
// relayed updates alone.
#[test]
fn observer_tracker_mirrors_remote_vessel() {
    let mut harness = ServerHarness::start(test_config());

    let observer_config = ClientConfig::new(harness.addr);
    let observer_conn = Connection::connect(&observer_config).unwrap();
    observer_conn.send_debug("observer online").unwrap();
    let mut observer = VesselTracker::new(observer_conn, &observer_config);
    settle();

    let sender_config = ClientConfig::new(harness.addr);
    let sender = Connection::connect(&sender_config).unwrap();
    let mut tracker = VesselTracker::new(sender, &sender_config);
    let vessel = VesselId::new();

    tracker.update(&[(vessel, status("Foo", 0.0))]).unwrap();
    settle();
    observer.pump().unwrap();
    assert_eq!(observer.latest(&vessel).unwrap().name, "Foo");

    tracker.update(&[(vessel, status("Foo", 3.0))]).unwrap();
    settle();
    observer.pump().unwrap();
    let mirrored = observer.latest(&vessel).unwrap();
    assert_eq!(mirrored.name, "Foo");
    assert_eq!(mirrored.position, Vec3d::new(3.0, 0.0, 0.0));

    harness.stop();
}

// Sessions that go silent are swept, with a disconnect event.
#[test]
fn idle_sessions_are_swept() {
    let config = ServerConfig::new(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .with_idle_timeout(Duration::from_millis(200))
        .with_sweep_interval(Duration::from_millis(50));
    let mut harness = ServerHarness::start(config);

    let client = Connection::connect(&ClientConfig::new(harness.addr)).unwrap();
    client.send_debug("hello").unwrap();

    // Wait past the idle timeout plus a sweep.
    thread::sleep(Duration::from_millis(800));
    harness.stop();

    let events = harness.events.lock();
    assert!(events
        .iter()
        .any(|event| matches!(event, ServerEvent::Connected { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, ServerEvent::Disconnected { .. })));
}
