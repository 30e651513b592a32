use tabled::Tabled;

#[derive(Tabled)]
pub struct ThroughputRow {
    pub scenario: String,
    pub size_mib: u64,
    pub runs: usize,
    #[tabled(display = "float2")]
    pub median: f64,
    #[tabled(display = "float2")]
    pub harmonic_mean: f64,
    #[tabled(display = "float2")]
    pub stddev: f64,
    #[tabled(display = "float2")]
    pub min: f64,
    #[tabled(display = "float2")]
    pub max: f64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}
