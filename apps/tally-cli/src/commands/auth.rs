//! # Auth Commands

use tally_client::{AuthApi, ClientConfig, ClientResult, Credentials, HttpBackend, Registration};
use tracing::debug;

pub async fn login(config: &ClientConfig, identifier: String, password: String) -> ClientResult<()> {
    debug!(%identifier, "login command");
    let backend = HttpBackend::new(config)?;

    let session = backend
        .login(&Credentials {
            identifier,
            password,
        })
        .await?;

    if let Some(user) = session.user() {
        eprintln!("Signed in as {}", user.display_name());
    }
    if let Some(token) = session.bearer() {
        println!("{}", token);
    }
    Ok(())
}

pub async fn register(
    config: &ClientConfig,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> ClientResult<()> {
    debug!(%email, "register command");
    let backend = HttpBackend::new(config)?;

    let session = backend
        .register(&Registration {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;

    if let Some(user) = session.user() {
        eprintln!("Registered {}", user.display_name());
    }
    if let Some(token) = session.bearer() {
        println!("{}", token);
    }
    Ok(())
}
