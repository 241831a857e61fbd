//! Command line arguments of the `meshforge-import` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::error::SettingsError;
use crate::settings::ImportSettings;

/// Import one source model and write the exported asset as RON.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "meshforge-import",
    version,
    about = "Compact and export a source model",
    long_about = "Loads a RON source model, merges meshes that share a material under the \
                  same attachment point, packs all mesh data into one vertex and one index \
                  buffer and writes the result below the output directory."
)]
pub struct ImportArgs {
    /// Source model (RON).
    #[arg(long)]
    pub source: PathBuf,

    /// Location of the exported asset, relative to the output directory.
    #[arg(long)]
    pub location: String,

    /// Import settings (TOML). Defaults are used when omitted.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Directory exported assets are written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Override the export type (`model` or `animation`).
    #[arg(long)]
    pub export_type: Option<String>,

    /// Skip merging meshes and pruning nodes.
    #[arg(long, conflicts_with = "compact")]
    pub no_compact: bool,

    /// Merge meshes and prune nodes even if the settings disable it.
    #[arg(long)]
    pub compact: bool,
}

impl ImportArgs {
    /// Settings from `--settings` (or defaults) with the overrides applied.
    pub fn import_settings(&self) -> Result<ImportSettings, SettingsError> {
        let mut settings = match &self.settings {
            Some(path) => ImportSettings::load(path)?,
            None => ImportSettings::default(),
        };
        if let Some(export_type) = &self.export_type {
            settings.export_type = export_type.clone();
        }
        if self.no_compact {
            settings.compact = false;
        } else if self.compact {
            settings.compact = true;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_arguments() {
        let args =
            ImportArgs::try_parse_from(["meshforge-import", "--source", "a.ron", "--location", "a"])
                .unwrap();
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert_eq!(args.import_settings().unwrap(), ImportSettings::default());
    }

    #[test]
    fn overrides_apply() {
        let args = ImportArgs::try_parse_from([
            "meshforge-import",
            "--source",
            "a.ron",
            "--location",
            "a",
            "--export-type",
            "animation",
            "--no-compact",
        ])
        .unwrap();
        let settings = args.import_settings().unwrap();
        assert_eq!(settings.export_type, "animation");
        assert!(!settings.compact);
    }

    #[test]
    fn compact_flags_conflict() {
        let result = ImportArgs::try_parse_from([
            "meshforge-import",
            "--source",
            "a.ron",
            "--location",
            "a",
            "--compact",
            "--no-compact",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn location_is_required() {
        assert!(ImportArgs::try_parse_from(["meshforge-import", "--source", "a.ron"]).is_err());
    }
}
