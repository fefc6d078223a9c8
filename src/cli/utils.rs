use crate::cli::OutputFormat;
use log::{info, warn};
use std::env;

/*-------------------------------------------------------------------------------------------------
  Utility Functions
-------------------------------------------------------------------------------------------------*/

pub const OUTPUT_FORMAT_ENV_VAR: &str = "SUBNETPLAN_OUTPUT";

/// The output format given on the command line, else from the environment, else the default.
pub fn output_format(selected: Option<OutputFormat>) -> OutputFormat {
    selected.unwrap_or_else(|| get_env_var(OUTPUT_FORMAT_ENV_VAR, OutputFormat::default()))
}

/// Get a value from an environment variable or return the default.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_selected_output_format_wins() {
        assert_eq!(output_format(Some(OutputFormat::Json)), OutputFormat::Json);
    }

    #[test]
    fn test_get_env_var_falls_back_to_default() {
        let value: u32 = get_env_var("SUBNETPLAN_TEST_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TABLE".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("netmask".parse::<OutputFormat>().is_err());
    }
}
