use apiprobe_core::{school, Driver, SchoolClient};
use apiprobe_runner::{env_or, init_tracing};

const DEFAULT_TOKEN: &str = "your_access_token";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let base_url = env_or("SCHOOL_API_BASE_URL", school::DEFAULT_BASE_URL);
    let token = env_or("SCHOOL_API_TOKEN", DEFAULT_TOKEN);
    tracing::info!(%base_url, "running school API tests");

    let client = SchoolClient::new(&base_url, Some(&token));
    let outcome = client.run_tests(&mut Driver::new(std::io::stdout().lock()));
    tracing::debug!(?outcome, "school API tests done");
    Ok(())
}
