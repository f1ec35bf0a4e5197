use super::progress::Spinner;
use super::render;
use crate::boundary;
use crate::output::Output;
use color_eyre::Result;
use reelscout_config::Config;
use reelscout_core::DetailController;
use reelscout_models::{ImageSize, MediaKind};

pub async fn run_details(config: &Config, kind: MediaKind, id: u64, output: &Output) -> Result<()> {
    let client = super::catalog(config)?;
    let controller = DetailController::new(client.clone());

    let spinner = Spinner::start(format!("Loading {} {}...", kind, id), output);
    controller.load(kind, id).await;
    spinner.finish();

    let view = controller.view();
    if let Some(error) = &view.error {
        return Err(color_eyre::eyre::eyre!("Failed to load {} {}: {}", kind, id, error));
    }
    let Some(details) = &view.details else {
        return Err(color_eyre::eyre::eyre!("No details returned for {} {}", kind, id));
    };

    let poster_url = details
        .poster_path
        .as_deref()
        .map(|path| client.image_url(ImageSize::W500, path));
    boundary::guarded("details", output, || {
        render::render_details(details, poster_url.as_deref(), output)
    });
    Ok(())
}
