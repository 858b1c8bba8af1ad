//! The `send-debug` subcommand.

use std::net::SocketAddr;

use reckon_net::{ClientConfig, Connection, NetResult};
use tracing::info;

/// Sends a single Debug message.
pub fn run(server: SocketAddr, message: &str) -> NetResult<()> {
    let connection = Connection::connect(&ClientConfig::new(server))?;
    let sequence = connection.send_debug(message)?;
    info!(%server, sequence, "debug message sent");
    connection.close();
    Ok(())
}
