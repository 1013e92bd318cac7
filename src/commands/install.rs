//! The `mycli-install` command: wire the real system into the installer.
use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::config::{FallbackPolicy, InstallerConfig};
use crate::environment::HostEnv;
use crate::exec::SystemExecutor;
use crate::fetch;
use crate::installer::{self, Context, Outcome, RunOptions};
use crate::logging::Logger;
use crate::platform::Platform;

/// Run the installer against the real system.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or any install
/// step fails.
pub fn run(args: &Cli, log: &Logger) -> Result<Outcome> {
    let version = option_env!("MYCLI_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("mycli-install {version}"));

    let config = load_config(args)?;
    let platform = Platform::detect();
    let env = HostEnv::detect();
    let url = config.render_download_url(&platform);
    let fetcher = fetch::for_url(&url);

    let ctx = Context {
        config: &config,
        platform: &platform,
        env: &env,
        executor: &SystemExecutor,
        fetcher: fetcher.as_ref(),
        log,
        options: RunOptions {
            dry_run: args.dry_run,
            skip_path: args.skip_path,
        },
    };
    log.debug(&format!("{ctx:?}"));

    let result = installer::run(&ctx);
    log.print_summary();
    let outcome = result?;

    if !args.dry_run {
        let name = outcome.version.as_deref().unwrap_or(&config.binary_name);
        log.info(&format!("{name} is ready: {}", outcome.installed.display()));
    }
    Ok(outcome)
}

/// Load `--config` (or the defaults) and apply flag overrides.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed.
pub fn load_config(args: &Cli) -> Result<InstallerConfig> {
    let mut config = InstallerConfig::load(args.config.as_deref()).with_context(|| {
        format!(
            "loading installer configuration{}",
            args.config
                .as_ref()
                .map_or_else(String::new, |p| format!(" from {}", p.display()))
        )
    })?;
    if args.no_build {
        config.fallback = FallbackPolicy::Abort;
    }
    Ok(config)
}
