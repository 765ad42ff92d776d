use std::sync::OnceLock;
use std::time::Instant;

static CLOCK_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Milliseconds on a monotonic clock anchored at first use.
pub fn now_millis() -> i64 {
    let origin = CLOCK_ORIGIN.get_or_init(Instant::now);
    origin.elapsed().as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_never_goes_backwards() {
        let first = now_millis();
        let second = now_millis();
        assert!(second >= first);
        assert!(first >= 0);
    }
}
