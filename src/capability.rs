use std::sync::OnceLock;

/// Optional features detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Missing-value matrix rendering (`missing-matrix` build feature).
    pub missing_matrix: bool,
}

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

fn detect() -> Capabilities {
    Capabilities {
        missing_matrix: cfg!(feature = "missing-matrix"),
    }
}

/// Probe optional capabilities and record them for the process.
pub fn probe() -> Capabilities {
    let caps = *CAPABILITIES.get_or_init(detect);
    log::debug!("capabilities: {caps:?}");
    caps
}

/// Recorded capabilities (probing lazily if `probe` was never called).
pub fn get() -> Capabilities {
    *CAPABILITIES.get_or_init(detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_stable() {
        assert_eq!(probe(), get());
        assert_eq!(get().missing_matrix, cfg!(feature = "missing-matrix"));
    }
}
