//! Logger initialization: structured stderr output gated by an env filter.

use std::{str::FromStr, sync::Once};

use logforth::{append::Stderr, filter::EnvFilter};

static INIT: Once = Once::new();

pub fn init(log_filter: &str) {
    let log_filter = log_filter.to_owned();
    INIT.call_once(move || apply_logger(&log_filter));
}

fn apply_logger(log_filter: &str) {
    logforth::builder()
        .dispatch(|d| {
            let filter = EnvFilter::from_str(log_filter).unwrap_or_else(|_| {
                EnvFilter::from_str("info").expect("default filter should be valid")
            });

            d.filter(filter).append(Stderr::default())
        })
        .apply();
}
