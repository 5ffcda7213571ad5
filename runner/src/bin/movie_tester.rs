use apiprobe_core::{video, Driver, VideoClient};
use apiprobe_runner::{env_or, init_tracing};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let base_url = env_or("VIDEO_API_BASE_URL", video::DEFAULT_BASE_URL);
    tracing::info!(%base_url, "running video API tests");

    let client = VideoClient::new(&base_url).verbose(true);
    let outcome = client.run_tests(&mut Driver::new(std::io::stdout().lock()));
    tracing::debug!(?outcome, "video API tests done");
    Ok(())
}
