use std::path::PathBuf;

use clap::Parser;

use crate::map::LatLng;

#[derive(Parser, Debug, Clone)]
#[command(name = "issuemap")]
#[command(about = "Reported issues on a terminal map")]
#[command(version)]
pub struct Args {
    // Data
    /// Issue list location: a JSON file path or an http(s) URL
    #[arg(long)]
    pub source: String,

    /// Seconds between automatic refreshes (0 disables polling)
    #[arg(long, default_value = "30")]
    pub refresh_seconds: u64,

    // Viewport
    /// Initial map center as LAT,LNG
    #[arg(long, default_value = "12.9716,77.5946", value_parser = parse_lat_lng)]
    pub center: LatLng,

    /// Initial zoom level
    #[arg(long, default_value = "12")]
    pub zoom: f64,

    /// Zoom level used when flying to a focused issue
    #[arg(long, default_value = "14")]
    pub focus_zoom: f64,

    /// Duration of the fly-to animation (seconds)
    #[arg(long, default_value = "1.5")]
    pub fly_seconds: f64,

    /// Padding around fitted bounds (display units per side)
    #[arg(long, default_value = "50")]
    pub padding: f64,

    /// Maximum zoom level when fitting bounds
    #[arg(long, default_value = "15")]
    pub max_zoom: f64,

    /// Focus this coordinate (LAT,LNG) on startup
    #[arg(long, value_parser = parse_lat_lng)]
    pub focus: Option<LatLng>,

    // Debug
    /// Log file (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("issuemap")
                .join("issuemap.log")
        })
    }
}

/// Parse "12.97,77.59" into a coordinate pair
fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", s))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {}", lng.trim(), e))?;

    if !lat.is_finite() || !lng.is_finite() {
        return Err(format!("coordinates must be finite, got '{}'", s));
    }

    Ok(LatLng::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lng() {
        let ll = parse_lat_lng("12.9716, 77.5946").unwrap();
        assert_eq!(ll, LatLng::new(12.9716, 77.5946));

        assert!(parse_lat_lng("12.97").is_err());
        assert!(parse_lat_lng("north,77.59").is_err());
        assert!(parse_lat_lng("NaN,77.59").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["issuemap", "--source", "issues.json"]);
        assert_eq!(args.center, LatLng::new(12.9716, 77.5946));
        assert_eq!(args.zoom, 12.0);
        assert_eq!(args.focus_zoom, 14.0);
        assert_eq!(args.max_zoom, 15.0);
        assert_eq!(args.padding, 50.0);
        assert!(args.focus.is_none());
        assert_eq!(args.refresh_seconds, 30);
    }
}
