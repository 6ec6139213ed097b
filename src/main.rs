use julia_explorer::{config, JuliaApp};
use log::error;

fn main() -> eframe::Result<()> {
    env_logger::init();

    eframe::run_native(
        config::WINDOW_TITLE,
        config::native_options(),
        Box::new(|cc| {
            let app = JuliaApp::new(cc).inspect_err(|e| error!("{e}"))?;
            Ok(Box::new(app))
        }),
    )
}
