//! Wire-format parsing/rendering for [`DistanceMetric`]: `cosine`,
//! `euclidean`/`l2`, and `inner_product`/`dot`/`ip` aliases.

use crate::error::{bad_request, ApiError};
use velesdb_core::DistanceMetric;

/// Parses a case-insensitive metric name from request JSON.
pub fn parse_metric(raw: &str) -> Result<DistanceMetric, ApiError> {
    match raw.to_lowercase().as_str() {
        "cosine" => Ok(DistanceMetric::Cosine),
        "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
        "inner_product" | "innerproduct" | "dot" | "dot_product" | "ip" => {
            Ok(DistanceMetric::InnerProduct)
        }
        other => Err(bad_request(format!(
            "invalid metric '{other}'; expected one of cosine, euclidean, inner_product"
        ))),
    }
}

/// Renders a metric the way it came in on the wire.
#[must_use]
pub fn metric_name(metric: DistanceMetric) -> &'static str {
    match metric {
        DistanceMetric::Cosine => "cosine",
        DistanceMetric::Euclidean => "euclidean",
        DistanceMetric::InnerProduct => "inner_product",
    }
}
