//! Runs in its own process: the environment is read once per process.

use std::time::Duration;

use actions_remote::env;

#[test]
fn valid_timeout_is_applied() {
    // SAFETY: this binary has a single test, so no other thread reads the environment.
    unsafe { std::env::set_var("GITHUB_API_TIMEOUT_SECS", " 45 ") };

    let config = env::client_config().unwrap();

    assert_eq!(config.timeout, Some(Duration::from_secs(45)));
}
