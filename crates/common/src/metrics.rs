use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref COMMAND_COUNTER: CounterVec = register_counter_vec!(
        "orders_commands_total",
        "Total number of order operations handled",
        &["command", "status"]
    )
    .expect("metric cannot be created");

    pub static ref COMMAND_DURATION: HistogramVec = register_histogram_vec!(
        "orders_command_duration_seconds",
        "Order operation duration in seconds",
        &["command"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("metric cannot be created");

    pub static ref CACHE_REQUESTS: CounterVec = register_counter_vec!(
        "orders_cache_requests_total",
        "Cache lookups by cache and outcome",
        &["cache", "status"]
    )
    .expect("metric cannot be created");

    pub static ref PRODUCT_LOOKUPS: CounterVec = register_counter_vec!(
        "orders_product_lookups_total",
        "Product info resolutions by the source that answered",
        &["source"]
    )
    .expect("metric cannot be created");

    pub static ref SIDE_EFFECTS: CounterVec = register_counter_vec!(
        "orders_side_effects_total",
        "Best-effort side effects by outcome",
        &["effect", "outcome"]
    )
    .expect("metric cannot be created");
}

/// Best-effort operations whose failure never reaches the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    Publish,
    ListingInvalidate,
    ListingPopulate,
}

impl SideEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideEffect::Publish => "publish",
            SideEffect::ListingInvalidate => "listing_invalidate",
            SideEffect::ListingPopulate => "listing_populate",
        }
    }
}

/// Where a product snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSource {
    Local,
    Cache,
    Upstream,
}

impl ProductSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSource::Local => "local",
            ProductSource::Cache => "cache",
            ProductSource::Upstream => "upstream",
        }
    }
}

/// Get all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn record_command(command: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "error" };
    COMMAND_COUNTER.with_label_values(&[command, status]).inc();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration_secs);
}

pub fn record_cache_request(cache: &str, hit: bool) {
    let status = if hit { "hit" } else { "miss" };
    CACHE_REQUESTS.with_label_values(&[cache, status]).inc();
}

pub fn record_product_lookup(source: ProductSource) {
    PRODUCT_LOOKUPS.with_label_values(&[source.as_str()]).inc();
}

pub fn record_side_effect(effect: SideEffect, ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    SIDE_EFFECTS
        .with_label_values(&[effect.as_str(), outcome])
        .inc();
}

/// Current count for a side effect outcome
pub fn side_effect_count(effect: SideEffect, ok: bool) -> f64 {
    let outcome = if ok { "ok" } else { "failed" };
    SIDE_EFFECTS
        .with_label_values(&[effect.as_str(), outcome])
        .get()
}
