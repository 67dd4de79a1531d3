//! [`Args`] definitions.

use clap::Parser;

/// Server of the car rental reservation system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    ///
    /// Missing file is not an error: values come from `CONF.`-prefixed
    /// environment variables and defaults then.
    #[arg(short, long, env = "CONF_PATH", default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Parses [`Args`] from the command line and the environment.
    ///
    /// # Errors
    ///
    /// If the command line is malformed.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn reads_config_path() {
        let args =
            Args::try_parse_from(["server", "-c", "fleet.toml"]).unwrap();

        assert_eq!(args.config, "fleet.toml");
    }
}
