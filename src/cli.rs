//! Command-line interface definitions and helpers.
//!
//! This module contains the argument parsing plus the utility subcommands
//! that print and exit without entering the console.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::camera;
use crate::ndvi::ALL_PALETTES;

// ==================== Value Parsers ====================

/// Parse and validate a slider value in hundredths (-100..=100).
fn parse_units(s: &str) -> Result<i32, String> {
    let units: i32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;
    if !(-100..=100).contains(&units) {
        return Err(format!(
            "Slider value must be between -100 and 100, got {}",
            units
        ));
    }
    Ok(units)
}

/// Parse a palette display name, accepting any capitalization.
fn parse_palette(s: &str) -> Result<String, String> {
    ALL_PALETTES
        .iter()
        .find(|p| p.name().eq_ignore_ascii_case(s))
        .map(|p| p.name().to_string())
        .ok_or_else(|| {
            format!(
                "Unknown palette '{}'. Available palettes: NDVI Classic, Infrared, Thermal, Grayscale",
                s
            )
        })
}

/// Parse and validate ROI bounds (L,T,R,B percentages).
fn parse_roi(s: &str) -> Result<(i32, i32, i32, i32), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Invalid ROI format '{}'. Use L,T,R,B in percent (e.g., 20,20,80,80)",
            s
        ));
    }
    let mut bounds = [0i32; 4];
    for (slot, part) in bounds.iter_mut().zip(&parts) {
        let v: i32 = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid ROI bound '{}'", part))?;
        if !(0..=100).contains(&v) {
            return Err(format!("ROI bounds must be between 0 and 100, got {}", v));
        }
        *slot = v;
    }
    Ok((bounds[0], bounds[1], bounds[2], bounds[3]))
}

/// Parse an R,G,B color with 8-bit channels.
fn parse_color(s: &str) -> Result<(u8, u8, u8), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "Invalid color format '{}'. Use R,G,B (e.g., 0,255,0)",
            s
        ));
    }
    let r: u8 = parts[0]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid red channel '{}'", parts[0]))?;
    let g: u8 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid green channel '{}'", parts[1]))?;
    let b: u8 = parts[2]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid blue channel '{}'", parts[2]))?;
    Ok((r, g, b))
}

// ==================== CLI Arguments ====================

/// Terminal NDVI console rendering live camera frames as false color
#[derive(Parser, Debug)]
#[command(name = "raziel")]
#[command(version, about = "NDVI console: live false-color vegetation imaging in the terminal", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera device index (from list-cameras)
    #[arg(long, default_value = "0")]
    pub camera: u32,

    /// Initial range minimum in hundredths (-100..=100), overrides saved value
    #[arg(long, allow_negative_numbers = true, value_parser = parse_units)]
    pub min: Option<i32>,

    /// Initial range maximum in hundredths (-100..=100), overrides saved value
    #[arg(long, allow_negative_numbers = true, value_parser = parse_units)]
    pub max: Option<i32>,

    /// Palette to start with (name from `palettes`, any capitalization)
    #[arg(long, value_parser = parse_palette)]
    pub palette: Option<String>,

    /// Region of interest bounds as L,T,R,B percentages (enables the ROI)
    #[arg(long, value_parser = parse_roi)]
    pub roi: Option<(i32, i32, i32, i32)>,

    /// Crosshair overlay color as R,G,B
    #[arg(long, value_parser = parse_color)]
    pub crosshair_color: Option<(u8, u8, u8)>,

    /// ROI overlay color as R,G,B
    #[arg(long, value_parser = parse_color)]
    pub roi_color: Option<(u8, u8, u8)>,

    /// Directory receiving snapshots and recordings
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// List the palettes and their anchor colors
    Palettes,
}

// ==================== Subcommand Handlers ====================

/// List available cameras and print them to stdout.
pub fn list_cameras() {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
                println!("On macOS, grant access in System Settings > Privacy & Security > Camera.");
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use --camera <index> to select a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the palettes with their low / mid / high anchor colors.
pub fn list_palettes() {
    println!("Available palettes:");
    for palette in ALL_PALETTES {
        let [low, mid, high] = palette.anchors();
        println!(
            "  {:<12}  low #{:02x}{:02x}{:02x}  mid #{:02x}{:02x}{:02x}  high #{:02x}{:02x}{:02x}",
            palette.name(),
            low[0],
            low[1],
            low[2],
            mid[0],
            mid[1],
            mid[2],
            high[0],
            high[1],
            high[2],
        );
    }
    println!();
    println!("Use --palette <name> to start with a palette.");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== CLI Default Values Tests ====================

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["raziel"]);
        assert!(args.command.is_none());
        assert_eq!(args.camera, 0);
        assert!(args.min.is_none());
        assert!(args.max.is_none());
        assert!(args.palette.is_none());
        assert!(args.roi.is_none());
        assert!(args.crosshair_color.is_none());
        assert!(args.roi_color.is_none());
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_args_camera_index() {
        let args = Args::parse_from(["raziel", "--camera", "2"]);
        assert_eq!(args.camera, 2);
    }

    #[test]
    fn test_args_min_max_values() {
        let args = Args::parse_from(["raziel", "--min", "-30", "--max", "80"]);
        assert_eq!(args.min, Some(-30));
        assert_eq!(args.max, Some(80));
    }

    #[test]
    fn test_args_palette_case_insensitive() {
        let args = Args::parse_from(["raziel", "--palette", "thermal"]);
        assert_eq!(args.palette, Some("Thermal".to_string()));

        let args = Args::parse_from(["raziel", "--palette", "ndvi classic"]);
        assert_eq!(args.palette, Some("NDVI Classic".to_string()));
    }

    #[test]
    fn test_args_unknown_palette_rejected() {
        let result = Args::try_parse_from(["raziel", "--palette", "Sepia"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_roi_bounds() {
        let args = Args::parse_from(["raziel", "--roi", "20,20,80,80"]);
        assert_eq!(args.roi, Some((20, 20, 80, 80)));
    }

    #[test]
    fn test_args_colors() {
        let args = Args::parse_from([
            "raziel",
            "--crosshair-color",
            "255,0,0",
            "--roi-color",
            "0,255,255",
        ]);
        assert_eq!(args.crosshair_color, Some((255, 0, 0)));
        assert_eq!(args.roi_color, Some((0, 255, 255)));
    }

    #[test]
    fn test_args_output_dir() {
        let args = Args::parse_from(["raziel", "--output-dir", "/tmp/captures"]);
        assert_eq!(args.output_dir, PathBuf::from("/tmp/captures"));
    }

    #[test]
    fn test_args_list_cameras_subcommand() {
        let args = Args::parse_from(["raziel", "list-cameras"]);
        assert!(matches!(args.command, Some(Command::ListCameras)));
    }

    #[test]
    fn test_args_palettes_subcommand() {
        let args = Args::parse_from(["raziel", "palettes"]);
        assert!(matches!(args.command, Some(Command::Palettes)));
    }

    #[test]
    fn test_args_combined_options() {
        let args = Args::parse_from([
            "raziel",
            "--camera",
            "1",
            "--min",
            "-10",
            "--max",
            "90",
            "--palette",
            "Infrared",
            "--roi",
            "10,10,90,90",
            "--output-dir",
            "/tmp",
        ]);
        assert_eq!(args.camera, 1);
        assert_eq!(args.min, Some(-10));
        assert_eq!(args.max, Some(90));
        assert_eq!(args.palette, Some("Infrared".to_string()));
        assert_eq!(args.roi, Some((10, 10, 90, 90)));
        assert_eq!(args.output_dir, PathBuf::from("/tmp"));
    }

    // ==================== Value Parser Tests ====================

    #[test]
    fn test_parse_units_boundaries() {
        assert_eq!(parse_units("-100").unwrap(), -100);
        assert_eq!(parse_units("100").unwrap(), 100);
        assert_eq!(parse_units("0").unwrap(), 0);
        assert!(parse_units("-101").is_err());
        assert!(parse_units("101").is_err());
    }

    #[test]
    fn test_parse_units_invalid_input() {
        assert!(parse_units("not_a_number").is_err());
        assert!(parse_units("").is_err());
        assert!(parse_units("1.5").is_err());
    }

    #[test]
    fn test_parse_roi_valid() {
        assert_eq!(parse_roi("20,20,80,80").unwrap(), (20, 20, 80, 80));
        assert_eq!(parse_roi("0, 0, 100, 100").unwrap(), (0, 0, 100, 100));
    }

    #[test]
    fn test_parse_roi_invalid() {
        assert!(parse_roi("20,20,80").is_err());
        assert!(parse_roi("20,20,80,80,5").is_err());
        assert!(parse_roi("20,20,80,200").is_err());
        assert!(parse_roi("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_color_valid() {
        assert_eq!(parse_color("0,255,0").unwrap(), (0, 255, 0));
        assert_eq!(parse_color("255, 255, 255").unwrap(), (255, 255, 255));
    }

    #[test]
    fn test_parse_color_invalid() {
        assert!(parse_color("0,255").is_err());
        assert!(parse_color("0,255,0,0").is_err());
        assert!(parse_color("0,256,0").is_err());
        assert!(parse_color("red").is_err());
    }

    #[test]
    fn test_parse_palette_exact_names() {
        for p in ALL_PALETTES {
            assert_eq!(parse_palette(p.name()).unwrap(), p.name());
        }
    }
}
