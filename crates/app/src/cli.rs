//! Command line interface

use capture::{AdvanceKey, Rect};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pagesnap")]
#[command(version, about = "Capture an on-screen region page by page while turning pages in a viewer")]
pub struct Cli {
    /// Monitor to select on, counting from 0
    #[arg(long, short = 'm', value_name = "INDEX")]
    pub monitor: Option<usize>,

    /// Number of pages to capture
    #[arg(long, short = 'p', value_name = "COUNT")]
    pub pages: Option<u32>,

    /// Seconds to wait after each page turn
    #[arg(long, short = 'd', value_name = "SECONDS")]
    pub delay: Option<f64>,

    /// Key that turns the page: right, down, page-down or space
    #[arg(long, short = 'k', value_name = "KEY")]
    pub key: Option<AdvanceKey>,

    /// Region relative to the monitor; skips the selection overlay
    #[arg(long, short = 'r', value_name = "X1,Y1,X2,Y2", value_parser = parse_region)]
    pub region: Option<Rect>,

    /// Directory that receives the page folder
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print the available monitors and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_monitors: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Parse `x1,y1,x2,y2` into a normalized rectangle with area
pub fn parse_region(value: &str) -> Result<Rect, String> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{value}': {e}"))?;

    let [x1, y1, x2, y2] = parts[..] else {
        return Err(format!("expected 4 comma-separated values, got {}", parts.len()));
    };

    let rect = Rect::new(x1, y1, x2, y2).normalized();
    if rect.is_empty() {
        return Err(format!("region '{value}' has no area"));
    }
    Ok(rect)
}
