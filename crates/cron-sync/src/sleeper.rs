use std::thread;
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockSleeper;
    use super::*;

    #[test]
    fn test_real_sleeper_sleeps() {
        let sleeper = RealSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_millis(10));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_mock_sleeper_does_not_sleep() {
        let sleeper = MockSleeper::new();
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_secs(10));
        sleeper.sleep(Duration::from_secs(20));

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(
            sleeper.durations(),
            vec![Duration::from_secs(10), Duration::from_secs(20)]
        );
    }
}
