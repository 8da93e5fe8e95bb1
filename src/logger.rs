use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set. Audit events are always shown.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "hms_engine=debug,audit=info,info"
    } else {
        "hms_engine=info,audit=info"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // try_init: a subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_keep_audit_events() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(directives.split(',').any(|d| d == "audit=info"), "{}", directives);
            assert!(EnvFilter::try_new(directives).is_ok());
        }
    }
}
