use apiprobe_core::direct;
use apiprobe_runner::{env_or, init_tracing};

const DEFAULT_URL: &str = "https://www.baidu.com";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let url = env_or("FETCH_URL", DEFAULT_URL);
    let response = direct::fetch(&url)?;
    direct::describe(&response, &mut std::io::stdout().lock())?;
    Ok(())
}
