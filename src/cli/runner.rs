use tracing::info;
use tracing_subscriber::EnvFilter;

use fixelevs::{ConfigFile, fix_elevations};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    if args.log {
        init_logging();
    }

    if args.config.is_none() && args.recf.is_none() {
        return Err(AppError::MissingArgument {
            arg: "--config or --recf".to_string(),
        });
    }

    let base = match &args.config {
        Some(path) => {
            info!("Reading config: {:?}", path);
            ConfigFile::from_path(path)?
        }
        None => ConfigFile::default(),
    };
    let params = base.merge(args.overrides()).validate()?;

    info!("Reach table: {:?}", params.recf);
    info!("Output stem: {:?}", params.output);

    let report = fix_elevations(&params)?;

    info!("Rows: {}", report.rows);
    info!("Reaches: {}", report.reaches);
    info!("Changed: {}", report.changed);
    if params.resolve_confluences {
        info!("Confluence rows lowered: {}", report.confluences_lowered);
    }
    info!("Points: {:?}", report.points_path);
    if let Some(raster) = &report.raster_path {
        info!("Raster: {:?}", raster);
    }
    Ok(())
}
