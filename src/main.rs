mod core;
mod gui;
mod navigation;
mod playback;
mod social;

use eframe::egui;
use gui::FeedPlayerApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Optional first argument: path to a catalog file
    let catalog_arg = std::env::args().nth(1);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Clip Feed"),
        ..Default::default()
    };

    eframe::run_native(
        "Clip Feed",
        options,
        Box::new(|cc| {
            match FeedPlayerApp::new(cc, catalog_arg) {
                Ok(app) => Ok(Box::new(app)),
                Err(e) => {
                    eprintln!("Failed to initialize app: {}", e);
                    std::process::exit(1);
                }
            }
        }),
    ).map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
