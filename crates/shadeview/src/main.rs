mod cli;

use anyhow::Result;
use shadeview_engine::batch;
use shadeview_engine::config::ViewerConfig;
use shadeview_engine::device::GpuInit;
use shadeview_engine::logging::{init_logging, LoggingConfig};
use shadeview_engine::window::Runtime;

use cli::Mode;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::default();
    let gpu_init = GpuInit::default();

    match cli::parse_mode(std::env::args_os().skip(1)) {
        Mode::Interactive => {
            log::info!(
                "watching {} and {}",
                config.vertex_shader.display(),
                config.fragment_shader.display()
            );
            Runtime::run(config, gpu_init)
        }
        Mode::Batch { input, output } => batch::process_image(input, output, &config, gpu_init),
    }
}
