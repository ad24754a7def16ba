use std::path::Path;
use std::process::ExitCode;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use cupnooble::bootstrap::GameResources;
use cupnooble::frame::{PresentationPlugins, SimulationPlugins};

fn main() -> ExitCode {
    let resources = match GameResources::load(Path::new("assets")) {
        Ok(resources) => resources,
        Err(err) => {
            eprintln!("cupnooble: {err}");
            return ExitCode::FAILURE;
        }
    };
    let display = resources.cfg.display.clone();

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Cup Nooble".into(),
                    resolution: WindowResolution::new(display.window_width, display.window_height),
                    present_mode: PresentMode::AutoVsync,
                    resizable: false,
                    ..default()
                }),
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    );
    resources.insert_into(&mut app);
    app.add_plugins((SimulationPlugins, PresentationPlugins)).run();

    ExitCode::SUCCESS
}
