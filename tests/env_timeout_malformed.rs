//! Runs in its own process: the environment is read once per process.

use actions_remote::{Error, env};

#[test]
fn malformed_timeout_is_a_configuration_error() {
    // SAFETY: this binary has a single test, so no other thread reads the environment.
    unsafe { std::env::set_var("GITHUB_API_TIMEOUT_SECS", "ten") };

    let err = env::client_config().unwrap_err();

    assert!(
        matches!(&err, Error::Configuration(message)
            if message.contains("GITHUB_API_TIMEOUT_SECS")),
        "{err}"
    );
    assert!(matches!(
        env::GITHUB_API_TIMEOUT_SECS.as_ref(),
        Some(Err(_))
    ));
}
