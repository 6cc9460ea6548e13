//! `inspector serve`: run one request inspector backend
//!
//! ```bash
//! inspector serve            # port 8081
//! inspector serve 8082 --name Edge
//! ```

use crate::error::CliResult;
use inspector_config::ServerSettings;
use inspector_core::InspectorServer;
use std::io::Write;

pub async fn run(settings: ServerSettings) -> CliResult<()> {
    let server = InspectorServer::bind(settings.server_config()?).await?;
    let port = server.port();

    {
        let mut out = std::io::stdout().lock();
        out.write_all(server.banner().as_bytes())?;
        out.flush()?;
    }

    server.run().await?;

    println!("\nServer on port {} stopped", port);
    Ok(())
}
