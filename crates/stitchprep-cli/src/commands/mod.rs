pub mod config;
pub mod estimate;
pub mod info;
pub mod pipeline;

/// Parse `X,Y,Z` into three floats.
pub fn parse_triplet(s: &str) -> Result<[f64; 3], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 3 comma-separated values, got {}", v.len()))
}
