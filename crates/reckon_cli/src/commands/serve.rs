//! The `serve` subcommand.

use std::net::SocketAddr;
use std::time::Duration;

use reckon_net::{NetResult, Server, ServerConfig};
use tracing::info;

/// Binds the server and runs the routing loop until terminated.
pub fn run(bind: SocketAddr, idle_timeout_secs: u64) -> NetResult<()> {
    let config =
        ServerConfig::new(bind).with_idle_timeout(Duration::from_secs(idle_timeout_secs));
    let mut server = Server::bind(config)?;
    info!(addr = %server.local_addr()?, "listening");
    server.run();
    Ok(())
}
