use std::io::{self, Write};

use clap::Parser;

use raziel::cli::{self, Args, Command};
use raziel::event_loop::{Console, ConsoleOptions};
use raziel::settings;
use raziel::terminal::Tui;

fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::ListCameras) => {
            cli::list_cameras();
            return;
        }
        Some(Command::Palettes) => {
            cli::list_palettes();
            return;
        }
        None => {}
    }

    if let Err(e) = run_console(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Build the console from CLI arguments and drive it to completion.
fn run_console(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut console = Console::new(ConsoleOptions {
        camera_index: args.camera,
        settings_path: settings::default_path(),
        output_dir: args.output_dir,
    });

    // Saved settings first, CLI overrides on top
    console.restore_settings();
    if let Some(units) = args.min {
        console.set_min_units(units);
    }
    if let Some(units) = args.max {
        console.set_max_units(units);
    }
    if let Some(name) = &args.palette {
        console.select_palette(name);
    }
    if let Some((left, top, right, bottom)) = args.roi {
        console.set_roi_bounds(left, top, right, bottom);
    }
    if let Some((r, g, b)) = args.crosshair_color {
        console.set_crosshair_color([b, g, r]);
    }
    if let Some((r, g, b)) = args.roi_color {
        console.set_roi_color([b, g, r]);
    }

    let mut tui = Tui::new()?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(console.run(&mut tui));

    tui.restore()?;

    // Quit beep
    print!("\x07");
    io::stdout().flush()?;

    result
}
