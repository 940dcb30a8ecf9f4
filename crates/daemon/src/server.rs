//! TCP connection acceptance and the per-connection handshake (spec §4.2).
//!
//! Past the handshake, driving the actual file-list/generator/transfer
//! exchange belongs to whatever assembles [`core`]'s handshake primitives
//! with the `engine` and `transfer` crates; this module's job ends once a
//! [`core::SessionParams`] has been negotiated, matching how `engine`
//! itself stops short of owning the full session loop.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use rsync_core::session::{self, ClientOptions, SessionParams};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::secrets;

/// Serves one already-accepted connection: runs the server-side handshake
/// against `stream` using the modules in `config`, logging the outcome.
/// Returns the negotiated [`SessionParams`] on success so a caller that
/// wants to continue past the handshake (into file-list and transfer
/// handling) has what it needs to do so.
pub fn serve_connection(stream: &mut TcpStream, config: &DaemonConfig, checksum_seed: u32) -> Result<SessionParams, DaemonError> {
    let resolvers: Vec<Box<dyn Fn(&str) -> Option<Vec<u8>>>> = config
        .modules
        .iter()
        .map(|module| {
            let secrets_file = module.secrets_file.clone();
            let auth_users = module.auth_users.clone();
            let boxed: Box<dyn Fn(&str) -> Option<Vec<u8>>> = Box::new(move |username: &str| {
                if !auth_users.iter().any(|u| u == username) {
                    return None;
                }
                let path = secrets_file.as_ref()?;
                secrets::lookup_password(path, username).ok().flatten()
            });
            boxed
        })
        .collect();

    let modules: Vec<session::ServerModule<'_>> = config
        .modules
        .iter()
        .zip(&resolvers)
        .map(|(module, resolver)| session::ServerModule {
            name: module.name.clone(),
            comment: module.comment.clone(),
            secret_resolver: module.requires_auth().then_some(resolver.as_ref()),
        })
        .collect();

    let params = session::perform_server_handshake(stream, &modules, checksum_seed)?;
    logging::record(logging::Level::Info, format!("handshake completed, checksum seed {checksum_seed}"));
    Ok(params)
}

/// Runs a blocking accept loop on `listener`, spawning one OS thread per
/// connection. Each connection is served with a freshly generated checksum
/// seed (spec §4.2 step 8). Returns only on an I/O error from the listener
/// itself.
pub fn run(listener: TcpListener, config: Arc<DaemonConfig>) -> Result<(), DaemonError> {
    for incoming in listener.incoming() {
        let mut stream = incoming?;
        let config = Arc::clone(&config);
        thread::spawn(move || {
            let seed = session::generate_checksum_seed();
            if let Err(err) = serve_connection(&mut stream, &config, seed) {
                logging::record(logging::Level::Warning, format!("connection failed: {err}"));
            }
        });
    }
    Ok(())
}

/// Connects to a daemon at `address` and runs the client side of the
/// handshake for `module`, returning the negotiated [`SessionParams`].
/// Convenience wrapper over [`core::session::perform_client_handshake`] for
/// callers that only have a socket address, not an already-open stream.
pub fn connect_and_handshake(
    address: &str,
    module: &str,
    options: &ClientOptions,
) -> Result<(TcpStream, SessionParams), DaemonError> {
    let mut stream = TcpStream::connect(address)?;
    let params = session::perform_client_handshake(&mut stream, module, None, options)?;
    Ok((stream, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn serve_connection_negotiates_an_unauthenticated_module() {
        let config = DaemonConfig {
            modules: vec![ModuleConfig {
                name: "data".to_string(),
                path: PathBuf::from("/srv/data"),
                comment: String::new(),
                auth_users: vec![],
                secrets_file: None,
            }],
        };

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            serve_connection(&mut stream, &config, 99)
        });

        let options = ClientOptions {
            recurse: false,
            sender: false,
            verbosity: String::new(),
            extra_args: vec![],
            paths: vec![],
        };
        let mut client = TcpStream::connect(addr).unwrap();
        let params = session::perform_client_handshake(&mut client, "data", None, &options).unwrap();
        assert_eq!(params.checksum_seed, 99);

        let server_params = server.join().unwrap().unwrap();
        assert_eq!(server_params.checksum_seed, 99);
        let _ = client.flush();
    }
}
