//! Typed configuration produced by a successful validation.

use crate::raw::RawValue;
use crate::schema::MODEL_SUBSECTIONS;
use crate::validate::CheckedTree;
use crate::{ConfigError, RawConfigTree, SchemaTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level sections a `VakConfig` has a field for.
const TYPED_SECTIONS: &[&str] = &[
    "PREP",
    "SPECT_PARAMS",
    "DATALOADER",
    "TRAIN",
    "LEARNCURVE",
    "EVAL",
    "PREDICT",
];

/// Root config: one field group per section present in the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VakConfig {
    #[serde(default, rename = "PREP", skip_serializing_if = "Option::is_none")]
    pub prep: Option<PrepConfig>,
    #[serde(default, rename = "SPECT_PARAMS", skip_serializing_if = "Option::is_none")]
    pub spect_params: Option<SpectParamsConfig>,
    #[serde(default, rename = "DATALOADER", skip_serializing_if = "Option::is_none")]
    pub dataloader: Option<DataLoaderConfig>,
    #[serde(default, rename = "TRAIN", skip_serializing_if = "Option::is_none")]
    pub train: Option<TrainConfig>,
    #[serde(default, rename = "LEARNCURVE", skip_serializing_if = "Option::is_none")]
    pub learncurve: Option<LearncurveConfig>,
    #[serde(default, rename = "EVAL", skip_serializing_if = "Option::is_none")]
    pub eval: Option<EvalConfig>,
    #[serde(default, rename = "PREDICT", skip_serializing_if = "Option::is_none")]
    pub predict: Option<PredictConfig>,
    /// Per-model hyperparameter sections, keyed by model name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, ModelConfig>,
}

impl VakConfig {
    /// Validate a raw tree against the built-in schema table.
    pub fn from_tree(tree: &RawConfigTree) -> Result<Self, ConfigError> {
        crate::validate(tree, &SchemaTable::vak())
    }

    /// Decode a checked tree into typed sections.
    ///
    /// Fails with `UnknownSection` for a section the checked tree holds but
    /// `VakConfig` has no field for, as happens with custom schema tables.
    pub fn from_checked(checked: &CheckedTree) -> Result<Self, ConfigError> {
        if let Some(section) = checked.section_names().find(|name| !holds_section(name)) {
            return Err(ConfigError::UnknownSection {
                section: section.to_string(),
            });
        }
        let value = checked.to_json()?;
        Ok(serde_json::from_value(value)?)
    }

    /// The command section present in this config, if any.
    pub fn command(&self) -> Option<Command> {
        Command::ALL
            .into_iter()
            .find(|command| self.has_section(*command))
    }

    /// Fail unless the section for `command` is present.
    ///
    /// Entry points call this before running so a config written for a
    /// different command is rejected up front.
    pub fn require(&self, command: Command) -> Result<(), ConfigError> {
        if self.has_section(command) {
            Ok(())
        } else {
            Err(ConfigError::MissingSection {
                section: command.section_name().to_string(),
            })
        }
    }

    /// Check that path options expected to exist on disk do exist.
    ///
    /// This touches the filesystem and is not part of validation.
    pub fn check_paths(&self) -> Result<(), ConfigError> {
        if let Some(data_dir) = self.prep.as_ref().and_then(|prep| prep.data_dir.as_ref()) {
            if !data_dir.is_dir() {
                return Err(ConfigError::NotADirectory {
                    section: "PREP".to_string(),
                    option: "data_dir".to_string(),
                    path: data_dir.clone(),
                });
            }
        }
        Ok(())
    }

    /// Names of the sections present, in schema order.
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            ("PREP", self.prep.is_some()),
            ("SPECT_PARAMS", self.spect_params.is_some()),
            ("DATALOADER", self.dataloader.is_some()),
            ("TRAIN", self.train.is_some()),
            ("LEARNCURVE", self.learncurve.is_some()),
            ("EVAL", self.eval.is_some()),
            ("PREDICT", self.predict.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| name.to_string())
        .collect();
        for (model, config) in &self.models {
            names.extend(
                config
                    .section_names()
                    .into_iter()
                    .map(|sub| format!("{model}.{sub}")),
            );
        }
        names
    }

    fn has_section(&self, command: Command) -> bool {
        match command {
            Command::Train => self.train.is_some(),
            Command::Learncurve => self.learncurve.is_some(),
            Command::Eval => self.eval.is_some(),
            Command::Predict => self.predict.is_some(),
        }
    }
}

/// Whether a checked section maps onto a `VakConfig` field.
fn holds_section(name: &str) -> bool {
    match name.split_once('.') {
        Some((_, sub)) => MODEL_SUBSECTIONS.iter().any(|known| *known == sub),
        None => TYPED_SECTIONS.iter().any(|known| *known == name),
    }
}

/// Run mode selected by a command section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Train,
    Learncurve,
    Eval,
    Predict,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Train,
        Command::Learncurve,
        Command::Eval,
        Command::Predict,
    ];

    /// Name of the section that configures this command.
    pub fn section_name(self) -> &'static str {
        match self {
            Command::Train => "TRAIN",
            Command::Learncurve => "LEARNCURVE",
            Command::Eval => "EVAL",
            Command::Predict => "PREDICT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.section_name().to_ascii_lowercase())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.section_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown command: {s}"))
    }
}

/// Dataset preparation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub audio_format: Option<AudioFormat>,
    #[serde(default)]
    pub spect_format: Option<SpectFormat>,
    #[serde(default)]
    pub annot_format: Option<String>,
    #[serde(default)]
    pub annot_file: Option<PathBuf>,
    #[serde(default)]
    pub labelset: Option<BTreeSet<String>>,
    /// Target split durations in seconds.
    #[serde(default)]
    pub train_dur: Option<f64>,
    #[serde(default)]
    pub val_dur: Option<f64>,
    #[serde(default)]
    pub test_dur: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Cbin,
    Wav,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectFormat {
    Mat,
    Npz,
}

/// Spectrogram generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectParamsConfig {
    pub fft_size: usize,
    pub step_size: usize,
    /// Low and high frequency cutoffs in Hz.
    #[serde(default)]
    pub freq_cutoffs: Option<[f64; 2]>,
    #[serde(default)]
    pub thresh: Option<f64>,
    #[serde(default)]
    pub transform_type: Option<TransformType>,
    pub spect_key: String,
    pub freq_key: String,
    pub timebins_key: String,
    pub audio_path_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformType {
    LogSpect,
    LogSpectPlusOne,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLoaderConfig {
    /// Window size in spectrogram time bins.
    pub window_size: usize,
}

/// Options for training models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub models: Vec<String>,
    pub root_results_dir: PathBuf,
    pub batch_size: usize,
    pub num_epochs: usize,
    pub normalize_spectrograms: bool,
    pub shuffle: bool,
    #[serde(default)]
    pub val_step: Option<usize>,
    #[serde(default)]
    pub ckpt_step: Option<usize>,
    #[serde(default)]
    pub patience: Option<usize>,
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
    pub num_workers: usize,
    pub device: String,
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub spect_scaler_path: Option<PathBuf>,
}

/// Training options plus the learning-curve sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearncurveConfig {
    #[serde(flatten)]
    pub train: TrainConfig,
    /// Training subset durations in seconds.
    pub train_set_durs: Vec<f64>,
    pub num_replicates: usize,
    #[serde(default)]
    pub previous_run_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    pub models: Vec<String>,
    pub checkpoint_path: PathBuf,
    pub labelmap_path: PathBuf,
    pub output_dir: PathBuf,
    pub batch_size: usize,
    pub num_workers: usize,
    pub device: String,
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub spect_scaler_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictConfig {
    pub models: Vec<String>,
    pub checkpoint_path: PathBuf,
    pub labelmap_path: PathBuf,
    pub batch_size: usize,
    #[serde(default)]
    pub annot_csv_filename: Option<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub min_segment_dur: Option<f64>,
    pub majority_vote: bool,
    pub num_workers: usize,
    pub device: String,
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub spect_scaler_path: Option<PathBuf>,
}

/// Hyperparameter sections for one model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<BTreeMap<String, RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<BTreeMap<String, RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, RawValue>>,
}

impl ModelConfig {
    fn section_names(&self) -> Vec<&'static str> {
        [
            ("optimizer", self.optimizer.is_some()),
            ("network", self.network.is_some()),
            ("loss", self.loss.is_some()),
            ("metrics", self.metrics.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Learning rate.
    pub lr: f64,
}
