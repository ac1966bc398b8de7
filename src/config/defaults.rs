use std::time::Duration;

pub(super) fn default_bucket_name() -> String {
    "global".to_string()
}

pub(super) const fn default_capacity() -> usize {
    20
}

pub(super) const fn default_worker_min() -> usize {
    3
}

pub(super) const fn default_worker_max() -> usize {
    5
}

pub(super) fn default_request_kind() -> String {
    "html".to_string()
}

pub(super) const fn default_pace() -> Duration {
    Duration::from_millis(100)
}

pub(super) const fn default_backoff() -> Duration {
    Duration::from_secs(3)
}

pub(super) const fn default_poll_wait() -> Duration {
    Duration::from_millis(250)
}

pub(super) const fn default_process_for() -> Duration {
    Duration::from_millis(750)
}

pub(super) const fn default_idle_for() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_scale_up_at() -> f64 {
    0.90
}

pub(super) const fn default_scale_down_at() -> f64 {
    0.10
}

pub(super) const fn default_tick() -> Duration {
    Duration::from_millis(200)
}
